//! Dispatch pass — send every due row and mark it, one table scan at a time.
//!
//! A pass is invocation-driven and stateless between calls: the sheet is
//! read fresh, the `sí` marker is the only record of what already went
//! out. A row is marked only when every destination accepted the message;
//! anything less leaves it pending for the next pass.

use std::time::Duration;

use chrono::NaiveDate;

use aviso_core::config::DispatchConfig;
use aviso_core::error::{AvisoError, Result};
use aviso_core::traits::{Channel, Worksheet};
use aviso_core::types::{DispatchReport, PendingRow, SendMode, SentRow, SENT_COLUMN, SENT_MARKER};

use crate::selector::select_pending;

/// Message shown when `DEST_NUMBERS` is empty. Surfaced verbatim by HTTP
/// and CLI callers.
pub const MISSING_DESTINATIONS_MSG: &str = "Configura DEST_NUMBERS (comma-separated)";

/// Runs dispatch passes against a channel/worksheet pair.
pub struct Dispatcher {
    recipients: Vec<String>,
    mode: SendMode,
    row_pace: Duration,
}

impl Dispatcher {
    pub fn new(recipients: Vec<String>, mode: SendMode, row_pace: Duration) -> Self {
        Self { recipients, mode, row_pace }
    }

    pub fn from_config(config: &DispatchConfig) -> Self {
        Self::new(
            config.destinations.clone(),
            SendMode::parse(&config.mode),
            Duration::from_millis(config.row_pace_ms),
        )
    }

    pub fn mode(&self) -> SendMode {
        self.mode
    }

    pub fn has_recipients(&self) -> bool {
        !self.recipients.is_empty()
    }

    /// The rows a pass would send right now. Read-only.
    pub async fn preview(&self, sheet: &dyn Worksheet, today: NaiveDate) -> Result<Vec<PendingRow>> {
        let rows = sheet.all_rows().await?;
        Ok(select_pending(&rows, self.mode, today))
    }

    /// One full dispatch pass.
    ///
    /// Preconditions (checked before any row is touched): a non-empty
    /// recipient list and a locatable sent-flag column. After that,
    /// per-row and per-destination failures are collected and the pass
    /// keeps going.
    pub async fn run(
        &self,
        channel: &dyn Channel,
        sheet: &dyn Worksheet,
        today: NaiveDate,
    ) -> Result<DispatchReport> {
        if self.recipients.is_empty() {
            return Err(AvisoError::config(MISSING_DESTINATIONS_MSG));
        }

        let headers = sheet.header_row().await?;
        let sent_col = headers
            .iter()
            .position(|h| h == SENT_COLUMN)
            .map(|i| i + 1)
            .ok_or_else(|| AvisoError::MissingColumn(SENT_COLUMN.into()))?;

        let rows = sheet.all_rows().await?;
        let pending = select_pending(&rows, self.mode, today);
        tracing::info!(
            "📤 Dispatch pass: {} pending row(s), {} destination(s), mode={}",
            pending.len(),
            self.recipients.len(),
            self.mode.as_str()
        );

        let mut sent = Vec::new();
        let mut errors = Vec::new();

        for row in &pending {
            let body = row.message_body();
            let mut ok_all = true;

            for number in &self.recipients {
                if let Err(e) = channel.send_text(number, &body).await {
                    ok_all = false;
                    tracing::warn!("⚠️ fila {}: send to {} failed: {e}", row.row, number);
                    errors.push(format!("fila {}: error enviando a {}: {e}", row.row, number));
                }
            }

            if ok_all {
                match sheet.update_cell(row.row, sent_col, SENT_MARKER).await {
                    Ok(()) => {
                        tracing::debug!("fila {} marcada '{}'", row.row, SENT_MARKER);
                        sent.push(SentRow { row: row.row, name: row.name.clone() });
                    }
                    Err(e) => {
                        // The messages went out but the durable claim did
                        // not stick; the row stays pending for the next
                        // pass rather than silently vanishing.
                        tracing::warn!("⚠️ fila {}: marking failed: {e}", row.row);
                        errors.push(format!("fila {}: no se pudo marcar Enviado: {e}", row.row));
                    }
                }
            }

            tokio::time::sleep(self.row_pace).await;
        }

        let count = sent.len();
        tracing::info!("✅ Dispatch pass done: {count} sent, {} error(s)", errors.len());
        Ok(DispatchReport { today, mode: self.mode, sent, count, errors })
    }
}
