//! # Aviso Sheets
//! Google Sheets worksheet gateway.
//!
//! Talks straight to the Sheets v4 and Drive v3 REST APIs with a
//! service-account credential. The spreadsheet is opened by key when
//! configured, otherwise found by name through Drive.

pub mod auth;
pub mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::SheetsClient;
