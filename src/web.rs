//! ==============================================================================
//! web.rs - dashboard http surface
//! ==============================================================================
//!
//! purpose:
//!     serves the clothesline dashboard and a small json api over the
//!     ClotheslineService. every user action answers with a distinct
//!     ok/error body so the page can show a toast either way.
//!
//! routes:
//!     GET  /              server-rendered dashboard
//!     GET  /history       server-rendered activity history
//!     GET  /api           current view (last snapshot + lastUpdate)
//!     POST /api/refresh   manual refresh
//!     POST /api/extend    manual keluar
//!     POST /api/retract   manual masuk
//!     POST /api/auto      ?enabled=true|false
//!     GET  /api/history   history grouped by day
//!     GET  /api/pins      virtual pin table
//!
//! view state:
//!     the poller's observer and the command handlers both write the view
//!     through a watch channel. commands update it optimistically; the next
//!     poll or refresh is the source of truth.
//!
//! ==============================================================================

use crate::domain::{gauge_percent, AppState};
use crate::error::ServiceError;
use crate::history::{group_by_day, DayGroup, HistoryEntry};
use crate::pins::{pin_table, PinBinding};
use crate::service::ClotheslineService;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

// ==============================================================================
// shared state
// ==============================================================================

#[derive(Clone)]
pub struct WebState {
    service: ClotheslineService,
    view: Arc<watch::Sender<AppState>>,
    history_refresh_seconds: u64,
}

impl WebState {
    pub fn new(service: ClotheslineService, view: Arc<watch::Sender<AppState>>, history_refresh_seconds: u64) -> Self {
        Self { service, view, history_refresh_seconds }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub title: String,
    pub message: String,
}

type ActionReply = (StatusCode, Json<ActionResponse>);

fn success(title: &str, message: &str) -> ActionReply {
    (
        StatusCode::OK,
        Json(ActionResponse { status: "ok".into(), title: title.into(), message: message.into() }),
    )
}

/// 409 when the lockout refused a command, 502 when the broker let us down
fn failure(err: &ServiceError, message: &str) -> ActionReply {
    warn!(error = %err, "{}", message);
    let (code, message) = match err {
        ServiceError::AutoModeActive => (StatusCode::CONFLICT, err.to_string()),
        _ => (StatusCode::BAD_GATEWAY, message.to_string()),
    };
    (code, Json(ActionResponse { status: "error".into(), title: "Error".into(), message }))
}

// ==============================================================================
// web server
// ==============================================================================

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/history", get(history_page_handler))
        .route("/api", get(api_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/extend", post(extend_handler))
        .route("/api/retract", post(retract_handler))
        .route("/api/auto", post(auto_handler))
        .route("/api/history", get(history_handler))
        .route("/api/pins", get(pins_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(bind: &str, state: WebState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "dashboard listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn api_handler(State(state): State<WebState>) -> Json<AppState> {
    Json(state.view.borrow().clone())
}

async fn refresh_handler(State(state): State<WebState>) -> ActionReply {
    match state.service.fetch_snapshot().await {
        Ok(data) => {
            state.view.send_modify(|view| view.apply_snapshot(data));
            success("Success", "Sensor data refreshed")
        }
        Err(e) => failure(&e, "Failed to fetch sensor data. Please try again."),
    }
}

async fn extend_handler(State(state): State<WebState>) -> ActionReply {
    match state.service.extend().await {
        Ok(()) => {
            state.view.send_modify(|view| view.sensor.clothesline_status = "keluar".to_string());
            success("Success", "Clothesline is being extended")
        }
        Err(e) => failure(&e, "Failed to extend clothesline"),
    }
}

async fn retract_handler(State(state): State<WebState>) -> ActionReply {
    match state.service.retract().await {
        Ok(()) => {
            state.view.send_modify(|view| view.sensor.clothesline_status = "masuk".to_string());
            success("Success", "Clothesline is being retracted")
        }
        Err(e) => failure(&e, "Failed to retract clothesline"),
    }
}

/// auto mode params
#[derive(Deserialize)]
struct AutoParams {
    enabled: bool,
}

async fn auto_handler(State(state): State<WebState>, Query(params): Query<AutoParams>) -> ActionReply {
    match state.service.set_auto_mode(params.enabled).await {
        Ok(()) => {
            state.view.send_modify(|view| view.sensor.auto_mode_active = params.enabled);
            if params.enabled {
                success(
                    "Auto Mode Activated",
                    "The system will now respond automatically to weather conditions",
                )
            } else {
                success("Auto Mode Deactivated", "You can now control the clothesline manually")
            }
        }
        Err(e) => failure(&e, "Failed to toggle auto mode"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryResponse {
    refresh_seconds: u64,
    total: usize,
    days: Vec<DayGroup>,
}

async fn history_handler(State(state): State<WebState>) -> Json<HistoryResponse> {
    let entries = state.service.history().await;
    Json(HistoryResponse {
        refresh_seconds: state.history_refresh_seconds,
        total: entries.len(),
        days: group_by_day(&entries),
    })
}

async fn pins_handler() -> Json<Vec<PinBinding>> {
    Json(pin_table())
}

// ==============================================================================
// html dashboard
// ==============================================================================

async fn dashboard_handler(State(state): State<WebState>) -> Html<String> {
    let view = state.view.borrow().clone();
    Html(render_dashboard(&view))
}

fn render_dashboard(view: &AppState) -> String {
    let sensor = &view.sensor;
    let status = sensor.status();
    // manual buttons are off while the device drives itself
    let manual = if sensor.auto_mode_active { "disabled" } else { "" };
    let checked = if sensor.auto_mode_active { "checked" } else { "" };
    let updated = view
        .last_update
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    format!(
        r#"<!doctype html>
<html>
<head><title>SunSafe Dashboard</title><meta http-equiv="refresh" content="5"></head>
<body style="font-family: system-ui; padding: 2rem; background: #0f172a; color: #eee;">
    <h1>Dashboard</h1>
    <div class="status-{status_class}" style="background: #1e293b; padding: 1.5rem; border-radius: 8px;">
        <h3>{label}</h3>
        <p style="color: #94a3b8;">{description}</p>
    </div>
    <div style="display: flex; gap: 2rem; margin: 2rem 0;">
        {light_gauge}
        {rain_gauge}
    </div>
    <h2>Manual Control</h2>
    <button onclick="act('/api/extend')" {manual}>Keluar</button>
    <button onclick="act('/api/retract')" {manual}>Masuk</button>
    <p><label><input type="checkbox" {checked} onchange="act('/api/auto?enabled=' + this.checked)"> Auto Mode</label></p>
    <p><button onclick="act('/api/refresh')">Refresh Data</button> <span style="color: #94a3b8;">last update: {updated}</span></p>
    <script>
    async function act(path) {{
        const res = await fetch(path, {{ method: 'POST' }});
        const body = await res.json();
        alert(body.title + ': ' + body.message);
        location.reload();
    }}
    </script>
    {nav}
</body>
</html>"#,
        status_class = status.as_str(),
        label = status.label(),
        description = status.description(),
        light_gauge = render_gauge("Light Intensity", sensor.light_intensity, "#22d3ee"),
        rain_gauge = render_gauge("Rain Intensity", sensor.rain_intensity, "#a78bfa"),
        manual = manual,
        checked = checked,
        updated = html_escape(&updated),
        nav = render_nav("/"),
    )
}

fn render_gauge(label: &str, value: i32, color: &str) -> String {
    let pct = gauge_percent(value, 100);
    format!(
        r#"<div style="text-align: center;">
            <div style="width: 9rem; height: 9rem; border-radius: 50%; background: conic-gradient({color} {pct}%, #334155 0); display: flex; align-items: center; justify-content: center;">
                <span style="font-size: 2rem; background: #0f172a; border-radius: 50%; padding: 1.2rem;">{value}%</span>
            </div>
            <p>{label}</p>
        </div>"#,
        color = color,
        pct = pct,
        value = value,
        label = html_escape(label),
    )
}

/// bottom navigation shared by both pages
fn render_nav(active: &str) -> String {
    let link = |href: &str, label: &str| {
        let color = if href == active { "#2dd4bf" } else { "#94a3b8" };
        format!(r#"<a href="{href}" style="color: {color}; margin: 0 1.5rem;">{label}</a>"#)
    };
    format!(
        r#"<nav style="position: fixed; bottom: 0; left: 0; right: 0; text-align: center; padding: 1rem; background: #1e293b;">{}{}</nav>"#,
        link("/", "Dashboard"),
        link("/history", "History"),
    )
}

// ==============================================================================
// html history
// ==============================================================================

async fn history_page_handler(State(state): State<WebState>) -> Html<String> {
    let entries = state.service.history().await;
    Html(render_history(&group_by_day(&entries), state.history_refresh_seconds))
}

fn render_history(days: &[DayGroup], refresh_seconds: u64) -> String {
    let body = if days.is_empty() {
        r#"<p style="text-align: center; color: #94a3b8;">No history available yet</p>"#.to_string()
    } else {
        days.iter()
            .map(|day| {
                let items: String = day.entries.iter().map(render_history_item).collect();
                format!(
                    r#"<h3 style="color: #94a3b8;">{heading}</h3>
    <div style="background: #1e293b; border-radius: 8px;">{items}</div>"#,
                    heading = day.date.format("%A, %B %-d"),
                    items = items,
                )
            })
            .collect()
    };

    format!(
        r#"<!doctype html>
<html>
<head><title>SunSafe History</title><meta http-equiv="refresh" content="{refresh_seconds}"></head>
<body style="font-family: system-ui; padding: 2rem 2rem 5rem; background: #0f172a; color: #eee;">
    <h1>Activity History <button onclick="location.reload()">Refresh</button></h1>
    {body}
    {nav}
</body>
</html>"#,
        refresh_seconds = refresh_seconds,
        body = body,
        nav = render_nav("/history"),
    )
}

fn render_history_item(entry: &HistoryEntry) -> String {
    let local = entry.timestamp.with_timezone(&chrono::Local);
    let mut levels = String::new();
    if let Some(light) = entry.light_level {
        levels.push_str(&format!("<span>Light: {}%</span> ", light));
    }
    if let Some(rain) = entry.rain_level {
        levels.push_str(&format!("<span>Rain: {}%</span> ", rain));
    }
    if let Some(status) = &entry.system_status {
        levels.push_str(&format!("<span>Status: {}</span>", html_escape(status)));
    }
    format!(
        r#"
        <div style="padding: 1rem; border-bottom: 1px solid #334155;">
            <strong>{action}</strong> <span style="color: #94a3b8;">{time}</span>
            <p style="color: #94a3b8; font-size: 0.8rem;">{levels}</p>
        </div>"#,
        action = html_escape(&entry.action),
        time = local.format("%H:%M:%S"),
        levels = levels,
    )
}

/// escape html special characters to prevent xss
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}
