//! Unified error types for Aviso.

use thiserror::Error;

/// Result type alias using AvisoError.
pub type Result<T> = std::result::Result<T, AvisoError>;

#[derive(Error, Debug)]
pub enum AvisoError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Channel (WhatsApp Web / WebDriver) errors
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Channel not connected: {0}")]
    ChannelNotConnected(String),

    // Spreadsheet errors
    #[error("Sheet error: {0}")]
    Sheet(String),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("No se encontró la columna '{0}' en encabezados")]
    MissingColumn(String),

    // Auth errors
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

impl AvisoError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn sheet(msg: impl Into<String>) -> Self {
        Self::Sheet(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthFailed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AvisoError::Channel("session gone".into());
        assert!(err.to_string().contains("session gone"));
    }

    #[test]
    fn test_missing_column_message() {
        // User-facing Spanish message, surfaced verbatim by the HTTP layer.
        let err = AvisoError::MissingColumn("Enviado".into());
        assert_eq!(
            err.to_string(),
            "No se encontró la columna 'Enviado' en encabezados"
        );
    }

    #[test]
    fn test_error_constructors() {
        let e1 = AvisoError::config("test");
        assert!(matches!(e1, AvisoError::Config(_)));

        let e2 = AvisoError::channel("test");
        assert!(matches!(e2, AvisoError::Channel(_)));

        let e3 = AvisoError::sheet("test");
        assert!(matches!(e3, AvisoError::Sheet(_)));

        let e4 = AvisoError::auth("test");
        assert!(matches!(e4, AvisoError::AuthFailed(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AvisoError = io_err.into();
        assert!(matches!(err, AvisoError::Io(_)));
    }
}
