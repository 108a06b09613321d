//! Minimal W3C WebDriver client — just the verbs the WhatsApp flow needs.
//! Protocol reference: https://www.w3.org/TR/webdriver2/
//!
//! Talks to a locally running chromedriver over REST. Only session
//! creation, navigation, XPath lookup, key input, and screenshots are
//! implemented; anything else is out of scope for driving one web app.

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use aviso_core::error::{AvisoError, Result};

/// W3C key under which element references are returned.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Opaque element reference, valid within its session.
#[derive(Debug, Clone)]
pub struct ElementId(pub(crate) String);

/// One WebDriver session against a chromedriver endpoint.
pub struct WebDriverClient {
    client: reqwest::Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    /// Start a Chrome session with the given arguments.
    /// API: POST /session
    pub async fn new_session(base_url: &str, chrome_args: &[String]) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::new();

        let body = serde_json::json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": chrome_args }
                }
            }
        });

        let response = client
            .post(format!("{base_url}/session"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("webdriver unreachable at {base_url}: {e}")))?;

        let status = response.status();
        let answer: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AvisoError::Channel(format!("session create: bad response: {e}")))?;
        if !status.is_success() {
            return Err(wire_error(&answer, "session create"));
        }
        let session_id = session_id_from(&answer)
            .ok_or_else(|| AvisoError::channel("session create: no sessionId in response"))?;

        tracing::info!("🧭 WebDriver session {session_id} started");
        Ok(Self { client, base_url, session_id })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.base_url, self.session_id, path)
    }

    /// Navigate the session to a URL.
    /// API: POST /session/{id}/url
    pub async fn goto(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("url"))
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("navigate failed: {e}")))?;
        into_value(response, "navigate").await?;
        Ok(())
    }

    /// Find one element by XPath. Absence is `Ok(None)`, not an error.
    /// API: POST /session/{id}/element
    pub async fn try_find_xpath(&self, xpath: &str) -> Result<Option<ElementId>> {
        let response = self
            .client
            .post(self.endpoint("element"))
            .json(&serde_json::json!({ "using": "xpath", "value": xpath }))
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("element lookup failed: {e}")))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AvisoError::Channel(format!("element lookup: bad response: {e}")))?;

        if !status.is_success() {
            if is_no_such_element(&body) {
                return Ok(None);
            }
            return Err(wire_error(&body, "element lookup"));
        }

        Ok(element_id_from(&body["value"]).map(ElementId))
    }

    /// Type text (or key codes) into an element.
    /// API: POST /session/{id}/element/{eid}/value
    pub async fn send_keys(&self, element: &ElementId, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint(&format!("element/{}/value", element.0)))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("send keys failed: {e}")))?;
        into_value(response, "send keys").await?;
        Ok(())
    }

    /// Capture the viewport as PNG bytes.
    /// API: GET /session/{id}/screenshot
    pub async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.endpoint("screenshot"))
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("screenshot failed: {e}")))?;

        let value = into_value(response, "screenshot").await?;
        let encoded = value
            .as_str()
            .ok_or_else(|| AvisoError::channel("screenshot: response is not a string"))?;
        BASE64
            .decode(encoded)
            .map_err(|e| AvisoError::Channel(format!("screenshot: base64 decode failed: {e}")))
    }

    /// End the session (closes the browser).
    /// API: DELETE /session/{id}
    pub async fn close(&self) -> Result<()> {
        self.client
            .delete(format!("{}/session/{}", self.base_url, self.session_id))
            .send()
            .await
            .map_err(|e| AvisoError::Channel(format!("session close failed: {e}")))?;
        tracing::debug!("WebDriver session {} closed", self.session_id);
        Ok(())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

/// Unwrap a WebDriver response into its `value`, mapping wire errors.
async fn into_value(response: reqwest::Response, what: &str) -> Result<serde_json::Value> {
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| AvisoError::Channel(format!("{what}: bad response: {e}")))?;
    if !status.is_success() {
        return Err(wire_error(&body, what));
    }
    Ok(body["value"].clone())
}

fn wire_error(body: &serde_json::Value, what: &str) -> AvisoError {
    let error = body["value"]["error"].as_str().unwrap_or("unknown");
    let message = body["value"]["message"].as_str().unwrap_or("");
    AvisoError::Channel(format!("{what}: {error}: {message}"))
}

fn is_no_such_element(body: &serde_json::Value) -> bool {
    body["value"]["error"].as_str() == Some("no such element")
}

/// chromedriver answers W3C-style (`value.sessionId`); older builds put
/// the id at the top level.
fn session_id_from(body: &serde_json::Value) -> Option<String> {
    body["value"]["sessionId"]
        .as_str()
        .or_else(|| body["sessionId"].as_str())
        .map(String::from)
}

fn element_id_from(value: &serde_json::Value) -> Option<String> {
    value[ELEMENT_KEY].as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_extraction() {
        let value = serde_json::json!({
            "element-6066-11e4-a52e-4f735466cecf": "e-42"
        });
        assert_eq!(element_id_from(&value), Some("e-42".to_string()));
        assert_eq!(element_id_from(&serde_json::json!({})), None);
    }

    #[test]
    fn test_session_id_extraction() {
        let w3c = serde_json::json!({ "value": { "sessionId": "abc", "capabilities": {} } });
        assert_eq!(session_id_from(&w3c), Some("abc".to_string()));

        let legacy = serde_json::json!({ "sessionId": "abc", "value": {} });
        assert_eq!(session_id_from(&legacy), Some("abc".to_string()));

        assert_eq!(session_id_from(&serde_json::json!({})), None);
    }

    #[test]
    fn test_no_such_element_detection() {
        let missing = serde_json::json!({
            "value": { "error": "no such element", "message": "..." }
        });
        assert!(is_no_such_element(&missing));

        let other = serde_json::json!({
            "value": { "error": "invalid session id", "message": "..." }
        });
        assert!(!is_no_such_element(&other));
    }

    #[test]
    fn test_wire_error_message() {
        let body = serde_json::json!({
            "value": { "error": "timeout", "message": "page load timed out" }
        });
        let err = wire_error(&body, "navigate");
        let text = err.to_string();
        assert!(text.contains("navigate"));
        assert!(text.contains("timeout"));
        assert!(text.contains("page load timed out"));
    }
}
