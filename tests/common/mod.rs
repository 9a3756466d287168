//! Scripted pin transport for integration tests.
//!
//! Records every read and write so tests can assert on ordering, and can be
//! told to fail specific pins or the next N reads.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use sunsafe::{PinTransport, PinValue, TransportError, VirtualPin};

#[derive(Default)]
struct MockState {
    values: HashMap<VirtualPin, String>,
    failing_pins: HashSet<VirtualPin>,
    failing_reads: usize,
    fail_writes: bool,
    reads: Vec<VirtualPin>,
    writes: Vec<(VirtualPin, PinValue)>,
}

#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// light/rain/status/auto preloaded with a healthy reading
    pub fn with_reading(light: &str, rain: &str, status: &str, auto: &str) -> Self {
        let mock = Self::new();
        mock.set(VirtualPin::LightIntensity, light);
        mock.set(VirtualPin::RainIntensity, rain);
        mock.set(VirtualPin::ClotheslineStatus, status);
        mock.set(VirtualPin::AutoMode, auto);
        mock
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn set(&self, pin: VirtualPin, raw: &str) {
        self.state.lock().unwrap().values.insert(pin, raw.to_string());
    }

    pub fn fail_pin(&self, pin: VirtualPin) {
        self.state.lock().unwrap().failing_pins.insert(pin);
    }

    pub fn heal_pin(&self, pin: VirtualPin) {
        self.state.lock().unwrap().failing_pins.remove(&pin);
    }

    /// the next `n` reads fail regardless of pin
    pub fn fail_next_reads(&self, n: usize) {
        self.state.lock().unwrap().failing_reads = n;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn reads(&self) -> Vec<VirtualPin> {
        self.state.lock().unwrap().reads.clone()
    }

    pub fn writes(&self) -> Vec<(VirtualPin, PinValue)> {
        self.state.lock().unwrap().writes.clone()
    }
}

#[async_trait]
impl PinTransport for MockTransport {
    async fn read_pin(&self, pin: VirtualPin) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.reads.push(pin);
        if state.failing_reads > 0 {
            state.failing_reads -= 1;
            return Err(TransportError::Status { pin, status: 503 });
        }
        if state.failing_pins.contains(&pin) {
            return Err(TransportError::Status { pin, status: 500 });
        }
        Ok(state.values.get(&pin).cloned().unwrap_or_default())
    }

    async fn write_pin(&self, pin: VirtualPin, value: PinValue) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes {
            return Err(TransportError::Status { pin, status: 502 });
        }
        state.writes.push((pin, value.clone()));
        state.values.insert(pin, value.to_string());
        Ok(())
    }
}
