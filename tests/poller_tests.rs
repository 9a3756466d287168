//! Integration tests: Poller lifecycle on a paused tokio clock.

mod common;

use async_trait::async_trait;
use common::MockTransport;
use std::sync::Arc;
use std::time::Duration;
use sunsafe::poller::ACTION_SENSOR_READING;
use sunsafe::{HistoryLog, PinTransport, PinValue, Poller, SensorData, TransportError, VirtualPin};
use tokio::sync::{mpsc, Notify, Semaphore};

const INTERVAL: Duration = Duration::from_secs(5);

fn observer() -> (
    impl FnMut(SensorData) + Send + 'static,
    mpsc::UnboundedReceiver<SensorData>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    (move |data: SensorData| { let _ = tx.send(data); }, rx)
}

// ── Gated transport: holds every read until the test opens the gate ──

struct GatedTransport {
    entered: Notify,
    gate: Semaphore,
    inner: MockTransport,
}

#[async_trait]
impl PinTransport for GatedTransport {
    async fn read_pin(&self, pin: VirtualPin) -> Result<String, TransportError> {
        self.entered.notify_one();
        let _permit = self.gate.acquire().await.expect("gate closed");
        self.inner.read_pin(pin).await
    }

    async fn write_pin(&self, pin: VirtualPin, value: PinValue) -> Result<(), TransportError> {
        self.inner.write_pin(pin, value).await
    }
}

// ── Tests ─────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_tick_is_swallowed_then_next_tick_delivers() {
    let mock = MockTransport::with_reading("42", "7", "keluar", "0").shared();
    mock.fail_next_reads(1);
    let history = HistoryLog::new();
    let mut poller = Poller::new(mock.clone(), history.clone());
    let (on_snapshot, mut rx) = observer();

    poller.start(INTERVAL, on_snapshot).await;
    let data = rx.recv().await.expect("second tick should deliver");

    assert_eq!(data.light_intensity, 42);
    assert_eq!(data.clothesline_status, "keluar");
    // one failed read from the first tick, four from the second
    assert_eq!(mock.reads().len(), 5);

    poller.stop().await;
    tokio::time::sleep(INTERVAL * 4).await;

    // observer dropped on stop: nothing more arrives
    assert!(rx.recv().await.is_none());
    assert_eq!(mock.reads().len(), 5);

    let entries = history.list().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, ACTION_SENSOR_READING);
    assert_eq!(entries[0].light_level, Some(42));
    assert_eq!(entries[0].rain_level, Some(7));
    assert_eq!(entries[0].system_status.as_deref(), Some("keluar"));
}

#[tokio::test(start_paused = true)]
async fn first_tick_fires_immediately() {
    let mock = MockTransport::with_reading("5", "95", "masuk", "1").shared();
    let history = HistoryLog::new();
    let mut poller = Poller::new(mock, history.clone()).show_sensor_data(true);
    let (on_snapshot, mut rx) = observer();
    let started = tokio::time::Instant::now();

    poller.start(INTERVAL, on_snapshot).await;
    let data = rx.recv().await.unwrap();

    assert!(started.elapsed() < INTERVAL);
    assert!(data.auto_mode_active);
    assert_eq!(history.len().await, 1);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn keeps_polling_on_every_interval() {
    let mock = MockTransport::with_reading("10", "20", "keluar", "0").shared();
    let history = HistoryLog::new();
    let mut poller = Poller::new(mock.clone(), history.clone());
    let (on_snapshot, mut rx) = observer();

    poller.start(INTERVAL, on_snapshot).await;
    rx.recv().await.unwrap();
    mock.set(VirtualPin::LightIntensity, "11");
    let second = rx.recv().await.unwrap();
    mock.set(VirtualPin::LightIntensity, "12");
    let third = rx.recv().await.unwrap();

    assert_eq!(second.light_intensity, 11);
    assert_eq!(third.light_intensity, 12);
    let levels: Vec<_> = history.list().await.into_iter().map(|e| e.light_level).collect();
    assert_eq!(levels, [Some(12), Some(11), Some(10)]);
    poller.stop().await;
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_never_halt_polling() {
    let mock = MockTransport::with_reading("1", "2", "moving", "0").shared();
    // five whole ticks fail on their first read
    mock.fail_next_reads(5);
    let history = HistoryLog::new();
    let mut poller = Poller::new(mock.clone(), history.clone());
    let (on_snapshot, mut rx) = observer();

    poller.start(INTERVAL, on_snapshot).await;
    let data = rx.recv().await.unwrap();

    assert_eq!(data.clothesline_status, "moving");
    assert_eq!(history.len().await, 1);
    poller.stop().await;
}

#[tokio::test]
async fn stop_twice_is_harmless() {
    let mock = MockTransport::with_reading("1", "2", "keluar", "0").shared();
    let mut poller = Poller::new(mock, HistoryLog::new());

    // idle poller
    poller.stop().await;
    assert!(!poller.is_active());

    let (on_snapshot, _rx) = observer();
    poller.start(INTERVAL, on_snapshot).await;
    assert!(poller.is_active());

    poller.stop().await;
    poller.stop().await;
    assert!(!poller.is_active());
}

#[tokio::test(start_paused = true)]
async fn stop_with_a_tick_in_flight_never_delivers() {
    let transport = Arc::new(GatedTransport {
        entered: Notify::new(),
        gate: Semaphore::new(0),
        inner: MockTransport::with_reading("42", "7", "keluar", "0"),
    });
    let history = HistoryLog::new();
    let mut poller = Poller::new(transport.clone(), history.clone());
    let (on_snapshot, mut rx) = observer();

    poller.start(INTERVAL, on_snapshot).await;
    // first read of the first tick is now parked on the gate
    transport.entered.notified().await;

    poller.stop().await;
    transport.gate.add_permits(16);
    tokio::time::sleep(INTERVAL * 2).await;

    assert!(rx.recv().await.is_none());
    assert!(history.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn restart_replaces_the_observer() {
    let mock = MockTransport::with_reading("30", "0", "keluar", "0").shared();
    let mut poller = Poller::new(mock, HistoryLog::new());
    let (first, mut first_rx) = observer();
    let (second, mut second_rx) = observer();

    poller.start(INTERVAL, first).await;
    first_rx.recv().await.unwrap();

    poller.start(INTERVAL, second).await;
    assert!(poller.is_active());
    assert_eq!(second_rx.recv().await.unwrap().light_intensity, 30);
    assert!(first_rx.recv().await.is_none());

    poller.stop().await;
}
