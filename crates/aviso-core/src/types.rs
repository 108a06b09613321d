//! Row and report types — the data model shared across the crates.
//!
//! Field names on the wire stay in Spanish (`Nombre`, `Cargo`, `Fecha`)
//! because they mirror the spreadsheet headers the operators maintain; the
//! JSON responses are consumed by people reading the sheet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The marker written to the `Enviado` column once a row has gone out.
pub const SENT_MARKER: &str = "sí";

/// Header label of the sent-flag column.
pub const SENT_COLUMN: &str = "Enviado";

/// A raw worksheet record: header label → cell text, as read from the sheet.
pub type RawRow = HashMap<String, String>;

/// Which rows a pass considers due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SendMode {
    /// Only rows whose date is exactly today.
    Today,
    /// Everything due up to and including today (catches up missed days).
    UntilToday,
}

impl SendMode {
    /// Parse a mode string. Unrecognized values fall back to [`Today`](Self::Today),
    /// matching how the deployment has always treated `SEND_MODE`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "until_today" => Self::UntilToday,
            _ => Self::Today,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::UntilToday => "until_today",
        }
    }
}

/// A row selected for dispatch, as shown by `/preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRow {
    /// 1-based worksheet row (header is row 1, data starts at 2).
    pub row: usize,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Cargo")]
    pub role: String,
    #[serde(rename = "Fecha")]
    pub due: NaiveDate,
}

impl PendingRow {
    /// Render the WhatsApp message body for this row.
    pub fn message_body(&self) -> String {
        format!(
            "🎉 *Recordatorio* \n- Nombre: {}\n- Cargo: {}\n- Fecha: {}",
            self.name,
            self.role,
            self.due.format("%d/%m/%Y")
        )
    }
}

/// A row confirmed sent during a dispatch pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentRow {
    pub row: usize,
    #[serde(rename = "Nombre")]
    pub name: String,
}

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub today: NaiveDate,
    pub mode: SendMode,
    pub sent: Vec<SentRow>,
    pub count: usize,
    /// Per-row diagnostics for anything that kept a row pending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Point-in-time view of service state, served by `/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub initialized: bool,
    pub whatsapp_connected: bool,
    pub sheets_connected: bool,
    /// Whether a logged-in WhatsApp Web session was observed. `null` until
    /// the browser session exists.
    pub session_ready: Option<bool>,
    pub worksheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_mode_parse() {
        assert_eq!(SendMode::parse("today"), SendMode::Today);
        assert_eq!(SendMode::parse("until_today"), SendMode::UntilToday);
        assert_eq!(SendMode::parse("  Until_Today  "), SendMode::UntilToday);
        assert_eq!(SendMode::parse("whenever"), SendMode::Today);
        assert_eq!(SendMode::parse(""), SendMode::Today);
    }

    #[test]
    fn test_message_body_format() {
        let row = PendingRow {
            row: 2,
            name: "Ana".into(),
            role: "Gerente".into(),
            due: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
        };
        assert_eq!(
            row.message_body(),
            "🎉 *Recordatorio* \n- Nombre: Ana\n- Cargo: Gerente\n- Fecha: 03/04/2025"
        );
    }

    #[test]
    fn test_pending_row_json_uses_sheet_headers() {
        let row = PendingRow {
            row: 5,
            name: "Luis".into(),
            role: "Analista".into(),
            due: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["row"], 5);
        assert_eq!(json["Nombre"], "Luis");
        assert_eq!(json["Cargo"], "Analista");
        assert_eq!(json["Fecha"], "2025-12-01");
    }

    #[test]
    fn test_report_serializes_mode_and_count() {
        let report = DispatchReport {
            today: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            mode: SendMode::UntilToday,
            sent: vec![SentRow { row: 2, name: "Ana".into() }],
            count: 1,
            errors: vec![],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "until_today");
        assert_eq!(json["count"], 1);
        assert_eq!(json["sent"][0]["Nombre"], "Ana");
        assert!(json.get("errors").is_none());
    }
}
