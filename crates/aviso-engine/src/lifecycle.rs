//! Service bring-up — one background attempt, observable from every route.
//!
//! The first readiness check arms a single background task that connects
//! the WhatsApp session and then the sheet. Progress is published as each
//! gateway comes up, so the QR page can already serve a screenshot while
//! the sheet connection is still pending (or has failed). A failed
//! bring-up is terminal for the process: operators read `/status`, fix the
//! environment, and restart.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::RwLock;

use aviso_core::error::Result;
use aviso_core::traits::{Channel, Worksheet};
use aviso_core::types::StatusSnapshot;

/// Bring-up phase. Moves strictly forward; `Failed` is never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// Both gateway handles, available once bring-up reached `Ready`.
#[derive(Clone)]
pub struct Gateways {
    pub channel: Arc<dyn Channel>,
    pub sheet: Arc<dyn Worksheet>,
}

/// Factory for the two gateways. Production wires WhatsApp Web and Google
/// Sheets here; tests plug in fakes.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open the messaging session. Implementations wait for login with a
    /// bounded budget but an unscanned QR is not an error — the session
    /// just is not ready yet.
    async fn connect_channel(&self) -> Result<Arc<dyn Channel>>;

    /// Open the worksheet connection.
    async fn connect_sheet(&self) -> Result<Arc<dyn Worksheet>>;
}

/// Single-flight bring-up coordinator.
pub struct Bootstrap {
    connector: Arc<dyn Connector>,
    worksheet_label: String,
    /// Guards the Uninitialized → Initializing edge.
    phase: Mutex<InitPhase>,
    channel: RwLock<Option<Arc<dyn Channel>>>,
    sheet: RwLock<Option<Arc<dyn Worksheet>>>,
    last_error: RwLock<Option<String>>,
}

impl Bootstrap {
    pub fn new(connector: Arc<dyn Connector>, worksheet_label: impl Into<String>) -> Self {
        Self {
            connector,
            worksheet_label: worksheet_label.into(),
            phase: Mutex::new(InitPhase::Uninitialized),
            channel: RwLock::new(None),
            sheet: RwLock::new(None),
            last_error: RwLock::new(None),
        }
    }

    /// Arm bring-up if it has not run yet. Any number of concurrent calls
    /// spawn exactly one attempt; later calls are no-ops whatever the
    /// current phase.
    pub fn ensure_started(self: &Arc<Self>) {
        {
            let mut phase = self.phase.lock().unwrap();
            if *phase != InitPhase::Uninitialized {
                return;
            }
            *phase = InitPhase::Initializing;
        }
        let boot = Arc::clone(self);
        tokio::spawn(async move { boot.bring_up().await });
    }

    async fn bring_up(self: Arc<Self>) {
        tracing::info!("🚀 Bring-up: WhatsApp session, then sheet connection");

        let channel = match self.connector.connect_channel().await {
            Ok(channel) => {
                *self.channel.write().await = Some(channel.clone());
                channel
            }
            Err(e) => {
                self.fail(format!("whatsapp: {e}")).await;
                return;
            }
        };
        tracing::info!("📱 Channel '{}' up", channel.name());

        match self.connector.connect_sheet().await {
            Ok(sheet) => {
                tracing::info!("📊 Worksheet '{}' connected", sheet.label());
                *self.sheet.write().await = Some(sheet);
            }
            Err(e) => {
                self.fail(format!("sheets: {e}")).await;
                return;
            }
        }

        *self.phase.lock().unwrap() = InitPhase::Ready;
        tracing::info!("✅ Bring-up complete");
    }

    async fn fail(&self, msg: String) {
        tracing::error!("❌ Bring-up failed: {msg}");
        *self.last_error.write().await = Some(msg);
        *self.phase.lock().unwrap() = InitPhase::Failed;
    }

    pub fn phase(&self) -> InitPhase {
        *self.phase.lock().unwrap()
    }

    pub async fn channel(&self) -> Option<Arc<dyn Channel>> {
        self.channel.read().await.clone()
    }

    pub async fn sheet(&self) -> Option<Arc<dyn Worksheet>> {
        self.sheet.read().await.clone()
    }

    /// Both handles, present only once bring-up fully succeeded.
    pub async fn gateways(&self) -> Option<Gateways> {
        let channel = self.channel.read().await.clone()?;
        let sheet = self.sheet.read().await.clone()?;
        Some(Gateways { channel, sheet })
    }

    pub async fn last_error(&self) -> Option<String> {
        self.last_error.read().await.clone()
    }

    /// Point-in-time view for `/status`. Probes the live session when a
    /// channel exists (a short bounded check inside the implementation).
    pub async fn snapshot(&self) -> StatusSnapshot {
        let channel = self.channel.read().await.clone();
        let sheet = self.sheet.read().await.clone();
        let session_ready = match &channel {
            Some(c) => Some(c.is_session_ready().await),
            None => None,
        };
        StatusSnapshot {
            initialized: self.phase() == InitPhase::Ready,
            whatsapp_connected: channel.is_some(),
            sheets_connected: sheet.is_some(),
            session_ready,
            worksheet: self.worksheet_label.clone(),
            error: self.last_error.read().await.clone(),
        }
    }
}
