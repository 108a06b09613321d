//! Gateway traits — the seams between the engine and the outside world.
//!
//! The engine never talks to WhatsApp or Google Sheets directly; it goes
//! through these two traits so tests can swap in fakes and the dispatch
//! logic stays independent of browser/REST plumbing.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RawRow;

/// An outbound messaging channel (production: WhatsApp Web via WebDriver).
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel identifier for logs.
    fn name(&self) -> &str;

    /// Whether a logged-in session is available. Implementations may poll
    /// with a bounded budget; exhaustion means `false`, never an error.
    async fn is_session_ready(&self) -> bool;

    /// Send a text message. Best-effort: success means the message was
    /// submitted, not that it was delivered (there are no receipts).
    async fn send_text(&self, destination: &str, body: &str) -> Result<()>;

    /// Capture the current session screen (the QR page during login).
    /// Implementations return empty bytes when no capture is possible.
    async fn screenshot(&self) -> Result<Vec<u8>>;
}

/// A tabular worksheet (production: one tab of a Google Sheets document).
///
/// Rows and columns are 1-based to match how spreadsheets are addressed;
/// row 1 is the header, data starts at row 2.
#[async_trait]
pub trait Worksheet: Send + Sync {
    /// Worksheet label for logs and `/status`.
    fn label(&self) -> &str;

    /// The header row (row 1), in column order.
    async fn header_row(&self) -> Result<Vec<String>>;

    /// All data rows as header-keyed records. Cells missing from short rows
    /// come back as empty strings.
    async fn all_rows(&self) -> Result<Vec<RawRow>>;

    /// Overwrite one cell.
    async fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullChannel;

    #[async_trait]
    impl Channel for NullChannel {
        fn name(&self) -> &str { "null" }
        async fn is_session_ready(&self) -> bool { false }
        async fn send_text(&self, _destination: &str, _body: &str) -> Result<()> { Ok(()) }
        async fn screenshot(&self) -> Result<Vec<u8>> { Ok(vec![]) }
    }

    #[tokio::test]
    async fn test_channel_object_safety() {
        let channel: Box<dyn Channel> = Box::new(NullChannel);
        assert_eq!(channel.name(), "null");
        assert!(!channel.is_session_ready().await);
        assert!(channel.send_text("5215500000000", "hola").await.is_ok());
    }
}
