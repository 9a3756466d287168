//! ==============================================================================
//! poller.rs - recurring sensor polling
//! ==============================================================================
//!
//! purpose:
//!     re-reads the sensor pins on a fixed interval and pushes each snapshot
//!     to one observer (the dashboard view), recording a "Sensor Reading"
//!     history entry per delivered snapshot.
//!
//! states:
//!
//! ```text
//!     ┌──────┐  start(interval, observer)  ┌────────┐
//!     │ Idle │ ──────────────────────────▶ │ Active │
//!     │      │ ◀────────────────────────── │        │
//!     └──────┘           stop()            └────────┘
//!
//!     the first tick fires right away and doubles as the initial reading,
//!     so the first reading of a session is logged exactly once.
//! ```
//!
//! failure policy:
//!     a failed tick is logged at warn and dropped. the timer keeps going.
//!     no backoff, no jitter.
//!
//! cancellation:
//!     the observer lives in a slot that ticks lock while delivering.
//!     stop() empties the slot under that lock before aborting the task,
//!     so once stop() returns the observer is never called again, even if a
//!     fetch was already in flight.
//!
//! ==============================================================================

use crate::domain::SensorData;
use crate::history::{HistoryLog, ReadingContext};
use crate::sensors;
use crate::transport::PinTransport;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const ACTION_SENSOR_READING: &str = "Sensor Reading";

/// tokio intervals cannot be zero
const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub type SnapshotObserver = Box<dyn FnMut(SensorData) + Send + 'static>;

type ObserverSlot = Arc<Mutex<Option<SnapshotObserver>>>;

enum PollerState {
    Idle,
    Active { task: JoinHandle<()>, observer: ObserverSlot },
}

pub struct Poller {
    transport: Arc<dyn PinTransport>,
    history: HistoryLog,
    show_sensor_data: bool,
    state: PollerState,
}

impl Poller {
    pub fn new(transport: Arc<dyn PinTransport>, history: HistoryLog) -> Self {
        Self { transport, history, show_sensor_data: false, state: PollerState::Idle }
    }

    /// log every delivered reading at info
    pub fn show_sensor_data(mut self, show: bool) -> Self {
        self.show_sensor_data = show;
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, PollerState::Active { .. })
    }

    /// begin polling; an already running poller is stopped and restarted
    pub async fn start<F>(&mut self, interval: Duration, on_snapshot: F)
    where
        F: FnMut(SensorData) + Send + 'static,
    {
        self.stop().await;

        let on_snapshot: SnapshotObserver = Box::new(on_snapshot);
        let observer: ObserverSlot = Arc::new(Mutex::new(Some(on_snapshot)));
        let task = tokio::spawn(run(
            Arc::clone(&self.transport),
            self.history.clone(),
            interval.max(MIN_INTERVAL),
            Arc::clone(&observer),
            self.show_sensor_data,
        ));

        info!(?interval, "polling started");
        self.state = PollerState::Active { task, observer };
    }

    /// stop polling; a no-op when already idle
    pub async fn stop(&mut self) {
        if let PollerState::Active { task, observer } = std::mem::replace(&mut self.state, PollerState::Idle) {
            // waits out a delivery in progress, then disarms the observer
            observer.lock().await.take();
            task.abort();
            info!("polling stopped");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let PollerState::Active { task, .. } = &self.state {
            task.abort();
        }
    }
}

async fn run(
    transport: Arc<dyn PinTransport>,
    history: HistoryLog,
    interval: Duration,
    observer: ObserverSlot,
    show_sensor_data: bool,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        tick(transport.as_ref(), &history, &observer, show_sensor_data).await;
    }
}

async fn tick(
    transport: &dyn PinTransport,
    history: &HistoryLog,
    observer: &Mutex<Option<SnapshotObserver>>,
    show_sensor_data: bool,
) {
    let data = match sensors::fetch_snapshot(transport).await {
        Ok(data) => data,
        Err(e) => {
            warn!(error = %e, "sensor poll failed, waiting for next tick");
            return;
        }
    };

    let mut slot = observer.lock().await;
    let Some(on_snapshot) = slot.as_mut() else {
        debug!("poller stopped mid-fetch, dropping snapshot");
        return;
    };

    if show_sensor_data {
        info!(
            light = data.light_intensity,
            rain = data.rain_intensity,
            status = %data.clothesline_status,
            auto_mode = data.auto_mode_active,
            "sensor reading"
        );
    }

    history.append(ACTION_SENSOR_READING, ReadingContext::from(&data)).await;
    on_snapshot(data);
}
