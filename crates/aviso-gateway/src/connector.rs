//! Production gateway wiring from environment configuration.

use std::sync::Arc;

use async_trait::async_trait;

use aviso_channels::WhatsAppWeb;
use aviso_core::config::AvisoConfig;
use aviso_core::error::Result;
use aviso_core::traits::{Channel, Worksheet};
use aviso_engine::Connector;
use aviso_sheets::SheetsClient;

/// Connects the real WhatsApp Web session and Sheets client.
pub struct EnvConnector {
    config: AvisoConfig,
}

impl EnvConnector {
    pub fn new(config: AvisoConfig) -> Self {
        Self { config }
    }

    /// Open the browser session and give the login the full poll budget.
    /// An unscanned QR is not an error; the session just reports not-ready
    /// until someone scans it.
    pub async fn open_channel(&self) -> Result<WhatsAppWeb> {
        let channel = WhatsAppWeb::open(&self.config.whatsapp).await?;
        channel.wait_until_ready().await;
        Ok(channel)
    }

    pub async fn open_sheet(&self) -> Result<SheetsClient> {
        SheetsClient::open(&self.config.sheet).await
    }
}

#[async_trait]
impl Connector for EnvConnector {
    async fn connect_channel(&self) -> Result<Arc<dyn Channel>> {
        Ok(Arc::new(self.open_channel().await?))
    }

    async fn connect_sheet(&self) -> Result<Arc<dyn Worksheet>> {
        Ok(Arc::new(self.open_sheet().await?))
    }
}
