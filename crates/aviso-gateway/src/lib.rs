//! Aviso HTTP gateway.
//!
//! A small operator-facing surface: the QR/landing page, readiness status,
//! a dry-run preview, and the endpoint that actually runs a dispatch pass.
//! Every route except `/ping` arms service bring-up on first contact.

pub mod connector;
pub mod routes;
pub mod server;

pub use connector::EnvConnector;
pub use server::{AppState, build_router, start};
