//! # Aviso Channels
//! Outbound messaging channel implementations.
//!
//! Currently one channel: WhatsApp Web, driven through a chromedriver
//! instance speaking the W3C WebDriver protocol. The browser profile is
//! persisted so the QR scan is a one-time step per deployment.

pub mod webdriver;
pub mod whatsapp;

pub use whatsapp::WhatsAppWeb;
