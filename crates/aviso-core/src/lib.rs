//! # Aviso Core
//!
//! Shared foundation for the Aviso reminder dispatcher.
//!
//! ## Architecture
//! ```text
//! Spreadsheet (Google Sheets)          WhatsApp Web (browser session)
//!        │                                      │
//!   Worksheet trait                        Channel trait
//!        └────────────┬─────────────────────────┘
//!                     ▼
//!            aviso-engine (select → send → mark "sí")
//!                     ▼
//!            aviso-gateway (HTTP: /, /qr.png, /status, /preview, /send_pending)
//! ```
//!
//! This crate holds what everything else shares: the error type, the
//! env-derived configuration, the row/report types, the two gateway
//! traits, and date handling (day-first parsing + zone-aware "today").

pub mod config;
pub mod dates;
pub mod error;
pub mod traits;
pub mod types;

pub use config::AvisoConfig;
pub use error::{AvisoError, Result};
pub use traits::{Channel, Worksheet};
pub use types::{DispatchReport, PendingRow, RawRow, SendMode, SentRow, StatusSnapshot};
