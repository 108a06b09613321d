//! Route handlers for the operator surface.
//!
//! Responses stay close to what operators already know: Spanish
//! user-facing strings, the auto-refreshing QR page, and JSON bodies that
//! echo the sheet's own column labels.

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use std::sync::Arc;

use aviso_core::error::AvisoError;
use aviso_engine::{Dispatcher, InitPhase, MISSING_DESTINATIONS_MSG};

use super::server::AppState;

const READY_TEXT: &str =
    "✅ Sesión lista. Sheets conectado. Usa /status, /preview, /send_pending";

/// Shown until the WhatsApp session is authenticated. Refreshes itself so
/// the operator sees a fresh QR capture every few seconds.
const QR_PAGE_HTML: &str = r#"<html><head><meta http-equiv="refresh" content="5"></head><body style="font-family: system-ui; padding: 24px;"><h2>Escanea el QR (WhatsApp &gt; Dispositivos vinculados)</h2><img src="/qr.png" alt="QR" style="max-width: 480px; border: 1px solid #ccc" /></body></html>"#;

/// Landing page: ready banner once the session is live, QR page otherwise.
pub async fn home(State(state): State<Arc<AppState>>) -> Html<&'static str> {
    state.boot.ensure_started();

    if state.boot.phase() == InitPhase::Ready {
        if let Some(channel) = state.boot.channel().await {
            if channel.is_session_ready().await {
                return Html(READY_TEXT);
            }
        }
    }
    Html(QR_PAGE_HTML)
}

async fn qr_bytes(state: &AppState) -> Vec<u8> {
    match state.boot.channel().await {
        Some(channel) => channel.screenshot().await.unwrap_or_default(),
        None => vec![],
    }
}

/// Current browser capture. Empty body while no session exists yet.
pub async fn qr_png(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.boot.ensure_started();
    ([(header::CONTENT_TYPE, "image/png")], qr_bytes(&state).await)
}

/// Readiness snapshot, always 200 so monitors can poll it freely.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.boot.ensure_started();

    let snapshot = state.boot.snapshot().await;
    let mut body = serde_json::to_value(&snapshot).unwrap_or_else(|_| serde_json::json!({}));
    body["uptime_secs"] = state.start_time.elapsed().as_secs().into();
    Json(body)
}

/// Dry run: the rows a dispatch pass would send right now. No side effects.
pub async fn preview(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.boot.ensure_started();

    let Some(sheet) = state.boot.sheet().await else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "Sheets no conectado aún" })),
        );
    };

    let dispatcher = Dispatcher::from_config(&state.config.dispatch);
    let today = state.clock.today();
    match dispatcher.preview(sheet.as_ref(), today).await {
        Ok(to_send) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "today": today,
                "mode": dispatcher.mode().as_str(),
                "to_send": to_send,
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// Run one dispatch pass over the sheet.
pub async fn send_pending(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.boot.ensure_started();

    let dispatcher = Dispatcher::from_config(&state.config.dispatch);
    if !dispatcher.has_recipients() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": MISSING_DESTINATIONS_MSG })),
        );
    }

    let Some(gateways) = state.boot.gateways().await else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": "Servicio no inicializado" })),
        );
    };

    let today = state.clock.today();
    match dispatcher
        .run(gateways.channel.as_ref(), gateways.sheet.as_ref(), today)
        .await
    {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::to_value(&report).unwrap_or_else(|_| serde_json::json!({}))),
        ),
        Err(e @ AvisoError::MissingColumn(_)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// Liveness probe. Never touches bring-up.
pub async fn ping() -> &'static str {
    "pong"
}
