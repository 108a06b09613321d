//! Aviso configuration system.
//!
//! Configuration is assembled from environment variables (the service is
//! deployed as a single container), with serde defaults so the same structs
//! also round-trip as JSON for display.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvisoConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl Default for AvisoConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sheet: SheetConfig::default(),
            whatsapp: WhatsAppConfig::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl AvisoConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary lookup function (testable core of
    /// [`from_env`](Self::from_env)).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.server.host = host;
        }
        if let Some(port) = get("PORT").and_then(|v| v.trim().parse().ok()) {
            config.server.port = port;
        }

        if let Some(key) = get("SHEET_KEY") {
            config.sheet.key = key.trim().to_string();
        }
        if let Some(name) = get("SHEET_NAME") {
            config.sheet.name = name.trim().to_string();
        }
        if let Some(ws) = get("WORKSHEET_NAME") {
            config.sheet.worksheet = ws.trim().to_string();
        }
        if let Some(creds) = get("GCP_CREDENTIALS_JSON") {
            config.sheet.credentials_json = creds;
        }

        if let Some(dir) = get("WA_PROFILE_DIR") {
            config.whatsapp.profile_dir = shellexpand::tilde(dir.trim()).into_owned();
        }
        if let Some(url) = get("WEBDRIVER_URL") {
            config.whatsapp.webdriver_url = url.trim().to_string();
        }

        if let Some(numbers) = get("DEST_NUMBERS") {
            config.dispatch.destinations = parse_destinations(&numbers);
        }
        if let Some(mode) = get("SEND_MODE") {
            config.dispatch.mode = mode.trim().to_lowercase();
        }
        if let Some(tz) = get("TZ") {
            config.dispatch.timezone = tz.trim().to_string();
        }

        config
    }
}

/// Split a comma-separated destination list, dropping empty entries.
fn parse_destinations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 10000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Spreadsheet configuration. The sheet is opened by `key` when set,
/// otherwise looked up by `name` through the Drive API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    /// Service-account JSON (the full credentials document, not a path).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub credentials_json: String,
}

fn default_worksheet() -> String { "Sheet1".into() }

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            name: String::new(),
            worksheet: default_worksheet(),
            credentials_json: String::new(),
        }
    }
}

/// WhatsApp Web session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// Browser profile directory. Persisting it keeps the WhatsApp login
    /// across restarts so the QR scan is a one-time step.
    #[serde(default = "default_profile_dir")]
    pub profile_dir: String,
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_login_attempts")]
    pub login_poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub login_poll_interval_ms: u64,
    #[serde(default = "default_composer_attempts")]
    pub composer_poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub composer_poll_interval_ms: u64,
    /// Delay after pressing Enter, giving the web client time to hand the
    /// message off before we navigate away.
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_profile_dir() -> String { "/data/whatsapp".into() }
fn default_webdriver_url() -> String { "http://127.0.0.1:9515".into() }
fn default_login_attempts() -> u32 { 60 }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_composer_attempts() -> u32 { 30 }
fn default_settle_ms() -> u64 { 2000 }

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            profile_dir: default_profile_dir(),
            webdriver_url: default_webdriver_url(),
            login_poll_attempts: default_login_attempts(),
            login_poll_interval_ms: default_poll_interval_ms(),
            composer_poll_attempts: default_composer_attempts(),
            composer_poll_interval_ms: default_poll_interval_ms(),
            settle_ms: default_settle_ms(),
        }
    }
}

/// Dispatch pass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Phone numbers every reminder is sent to, in order.
    #[serde(default)]
    pub destinations: Vec<String>,
    /// `today` or `until_today` (anything else falls back to `today`).
    #[serde(default = "default_mode")]
    pub mode: String,
    /// IANA zone name used to decide what "today" means.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_row_pace_ms")]
    pub row_pace_ms: u64,
}

fn default_mode() -> String { "today".into() }
fn default_timezone() -> String { "America/Mexico_City".into() }
fn default_row_pace_ms() -> u64 { 1000 }

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            destinations: vec![],
            mode: default_mode(),
            timezone: default_timezone(),
            row_pace_ms: default_row_pace_ms(),
        }
    }
}
