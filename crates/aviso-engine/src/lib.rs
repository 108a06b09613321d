//! # Aviso Engine
//!
//! The decision core: which rows are due, when the gateways come up, and
//! how a dispatch pass runs.
//!
//! ```text
//! lifecycle::Bootstrap ── one background bring-up ──▶ Gateways
//!                                                      │
//! dispatch::Dispatcher::run ──▶ selector::select_pending
//!                          ──▶ Channel::send_text (every destination)
//!                          ──▶ Worksheet::update_cell("sí")
//! ```
//!
//! Everything here is invocation-driven: no timers, no queues. Each pass
//! reads the sheet fresh and the "sí" marker is the only memory.

pub mod dispatch;
pub mod lifecycle;
pub mod selector;

pub use dispatch::{Dispatcher, MISSING_DESTINATIONS_MSG};
pub use lifecycle::{Bootstrap, Connector, Gateways, InitPhase};
pub use selector::select_pending;
