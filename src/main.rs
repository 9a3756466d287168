//! ==============================================================================
//! main.rs - sunsafe host entry point
//! ==============================================================================
//!
//! purpose:
//!     runs the clothesline dashboard next to (or far away from) the device.
//!     the device itself only talks to the blynk cloud; this host reads and
//!     writes its virtual pins through the cloud's external http api.
//!
//! responsibilities:
//!     - load configuration and set up logging
//!     - build the pin transport, the session history and the service
//!     - poll the sensor pins on a fixed interval into the dashboard view
//!     - serve the dashboard and its json api
//!     - stop polling cleanly on ctrl-c
//!
//! architecture:
//!
//!     ┌─────────────────────────────────────────────────────────────┐
//!     │                    rust host (this file)                    │
//!     │  ┌─────────────┐  ┌─────────────┐                           │
//!     │  │ poller      │  │ web server  │                           │
//!     │  │ (5s cycle)  │  │ (port 3000) │                           │
//!     │  └──────┬──────┘  └──────┬──────┘                           │
//!     │         │ watch<AppState>│                                  │
//!     │         └───────┬────────┘                                  │
//!     │           ┌─────┴──────┐                                    │
//!     │           │  service   │ <- service.rs (+ history log)      │
//!     │           └─────┬──────┘                                    │
//!     └─────────────────┼───────────────────────────────────────────┘
//!                       │ https, virtual pins v0..v5
//!                 ┌─────┴──────┐
//!                 │ blynk.cloud│ <-> clothesline controller
//!                 └────────────┘
//!
//! ==============================================================================

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sunsafe::config::HostConfig;
use sunsafe::transport::{BlynkTransport, PinTransport};
use sunsafe::web::{self, WebState};
use sunsafe::{AppState, ClotheslineService, HistoryLog};

#[tokio::main]
async fn main() -> Result<()> {
    // startup banner
    println!("===========================================================");
    println!("  SunSafe Host - Smart Clothesline Dashboard");
    println!("===========================================================");

    // step 1: load configuration
    let config = HostConfig::load_or_default();
    init_tracing(&config.logging.level);
    config.print_summary();

    // step 2: transport + session history
    let transport: Arc<dyn PinTransport> = Arc::new(
        BlynkTransport::from_config(&config.broker).context("failed to build http client")?,
    );
    let history = HistoryLog::new();
    let service = ClotheslineService::new(transport, history)
        .with_manual_lockout(config.control.lock_manual_in_auto);

    // step 3: shared dashboard view
    let (view, _) = watch::channel(AppState::default());
    let view = Arc::new(view);

    // step 4: start the web server in background
    let web_state = WebState::new(service.clone(), Arc::clone(&view), config.history.refresh_seconds);
    let bind = config.server.bind.clone();
    tokio::spawn(async move {
        if let Err(e) = web::serve(&bind, web_state).await {
            error!("web server error: {:#}", e);
        }
    });

    // step 5: poll the sensor pins into the view
    let interval = Duration::from_secs(config.polling.interval_seconds);
    let mut poller = service.poller().show_sensor_data(config.logging.show_sensor_data);
    let poll_view = Arc::clone(&view);
    poller
        .start(interval, move |data| poll_view.send_modify(|v| v.apply_snapshot(data)))
        .await;
    info!("[RUNTIME] sensor polling every {}s", config.polling.interval_seconds);

    tokio::signal::ctrl_c().await.context("failed to listen for ctrl-c")?;
    info!("[SHUTDOWN] ctrl-c received");
    poller.stop().await;
    Ok(())
}

/// RUST_LOG wins over the configured level
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
