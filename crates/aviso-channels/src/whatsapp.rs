//! WhatsApp Web channel.
//!
//! Drives the regular web client through a headless Chrome session: open
//! `web.whatsapp.com` with a persistent profile, wait for the logged-in
//! composer to appear, and send by navigating to the prefilled `send` URL
//! and pressing Enter. Fire-and-forget: there is no delivery receipt.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use aviso_core::config::WhatsAppConfig;
use aviso_core::error::{AvisoError, Result};
use aviso_core::traits::Channel;

use crate::webdriver::WebDriverClient;

const WHATSAPP_URL: &str = "https://web.whatsapp.com/";

/// The message compose box — present only once the session is logged in,
/// so it doubles as the login probe.
const COMPOSER_XPATH: &str = "//div[@contenteditable='true' and @role='textbox']";

/// WebDriver keycode for Enter; pressing it in the composer sends.
const ENTER_KEY: &str = "\u{E007}";

/// Short probe budget for status checks (the long login wait happens once
/// at bring-up with the configured budget).
const READY_PROBE_ATTEMPTS: u32 = 3;
const READY_PROBE_INTERVAL_MS: u64 = 500;

/// WhatsApp Web channel over a chromedriver session.
pub struct WhatsAppWeb {
    config: WhatsAppConfig,
    /// One browser, one operation at a time. Navigation during a send
    /// would abort it, so every operation holds the session lock.
    driver: Mutex<WebDriverClient>,
}

impl WhatsAppWeb {
    /// Start the browser session and open WhatsApp Web. The profile
    /// directory is created if missing; reusing it across restarts is
    /// what keeps the login alive.
    pub async fn open(config: &WhatsAppConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.profile_dir)?;

        let args = chrome_args(&config.profile_dir);
        let driver = WebDriverClient::new_session(&config.webdriver_url, &args).await?;
        driver.goto(WHATSAPP_URL).await?;

        Ok(Self {
            config: config.clone(),
            driver: Mutex::new(driver),
        })
    }

    /// Wait for the logged-in composer with the full login budget.
    /// Returns whether the session became ready; an unscanned QR is not
    /// an error, the human just has not gotten to it yet.
    pub async fn wait_until_ready(&self) -> bool {
        let driver = self.driver.lock().await;
        tracing::info!(
            "⏳ Waiting for WhatsApp login (up to {}s)...",
            self.config.login_poll_attempts as u64 * self.config.login_poll_interval_ms / 1000
        );
        let ready = wait_for_composer(
            &driver,
            self.config.login_poll_attempts,
            self.config.login_poll_interval_ms,
        )
        .await;
        if ready {
            tracing::info!("✅ WhatsApp session ready");
        } else {
            tracing::warn!("⚠️ WhatsApp session not ready yet — scan the QR at /");
        }
        ready
    }

    /// End the browser session. Used by the one-shot CLI paths; the
    /// long-running service keeps its session until the process exits.
    pub async fn close(&self) -> Result<()> {
        self.driver.lock().await.close().await
    }

}

#[async_trait]
impl Channel for WhatsAppWeb {
    fn name(&self) -> &str { "whatsapp-web" }

    async fn is_session_ready(&self) -> bool {
        let driver = self.driver.lock().await;
        // Navigating home keeps the page (and the QR screenshot, when
        // logged out) current.
        if let Err(e) = driver.goto(WHATSAPP_URL).await {
            tracing::debug!("session probe: navigation failed: {e}");
            return false;
        }
        wait_for_composer(&driver, READY_PROBE_ATTEMPTS, READY_PROBE_INTERVAL_MS).await
    }

    async fn send_text(&self, destination: &str, body: &str) -> Result<()> {
        let driver = self.driver.lock().await;

        driver.goto(&send_url(destination, body)).await?;
        wait_for_composer(
            &driver,
            self.config.composer_poll_attempts,
            self.config.composer_poll_interval_ms,
        )
        .await;
        // Authoritative lookup after the wait; the box may also have
        // appeared right at the deadline.
        let composer = driver
            .try_find_xpath(COMPOSER_XPATH)
            .await?
            .ok_or_else(|| AvisoError::Channel(format!("compose box not found for {destination}")))?;

        driver.send_keys(&composer, ENTER_KEY).await?;
        // Give the web client a moment to hand the message off before the
        // next navigation tears the page down.
        sleep(Duration::from_millis(self.config.settle_ms)).await;

        tracing::debug!("message submitted to {destination}");
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let driver = self.driver.lock().await;
        match driver.screenshot_png().await {
            Ok(png) => Ok(png),
            Err(e) => {
                tracing::warn!("⚠️ screenshot unavailable: {e}");
                Ok(vec![])
            }
        }
    }
}

/// Poll for the composer until found or the budget runs out.
async fn wait_for_composer(driver: &WebDriverClient, attempts: u32, interval_ms: u64) -> bool {
    for _ in 0..attempts {
        match driver.try_find_xpath(COMPOSER_XPATH).await {
            Ok(Some(_)) => return true,
            Ok(None) => {}
            Err(e) => tracing::debug!("composer probe error: {e}"),
        }
        sleep(Duration::from_millis(interval_ms)).await;
    }
    false
}

/// The prefilled-message URL. WhatsApp opens the chat with `text` already
/// in the composer; Enter does the rest.
fn send_url(phone: &str, text: &str) -> String {
    format!(
        "https://web.whatsapp.com/send?phone={}&text={}",
        phone,
        urlencoding::encode(text)
    )
}

/// Chrome flags for an unattended container: headless, no sandbox, and a
/// persistent profile.
fn chrome_args(profile_dir: &str) -> Vec<String> {
    vec![
        "--headless=new".into(),
        "--no-sandbox".into(),
        "--disable-dev-shm-usage".into(),
        "--disable-gpu".into(),
        "--window-size=1280,900".into(),
        format!("--user-data-dir={profile_dir}"),
        "--profile-directory=Default".into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_url_encodes_message() {
        let url = send_url("5215512345678", "🎉 *Recordatorio* \n- Nombre: Ana");
        assert!(url.starts_with("https://web.whatsapp.com/send?phone=5215512345678&text="));
        assert!(url.contains("%0A"), "newline must be percent-encoded");
        assert!(url.contains("%20"), "spaces must be percent-encoded");
        assert!(!url.contains('\n'));
        assert!(!url.contains("🎉"));
    }

    #[test]
    fn test_send_url_plain_text() {
        assert_eq!(
            send_url("521", "hola"),
            "https://web.whatsapp.com/send?phone=521&text=hola"
        );
    }

    #[test]
    fn test_chrome_args_pin_profile() {
        let args = chrome_args("/data/whatsapp");
        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--user-data-dir=/data/whatsapp".to_string()));
        assert!(args.contains(&"--profile-directory=Default".to_string()));
        assert!(args.contains(&"--window-size=1280,900".to_string()));
    }

    #[test]
    fn test_enter_key_is_webdriver_keycode() {
        assert_eq!(ENTER_KEY.chars().next(), Some('\u{E007}'));
    }
}
