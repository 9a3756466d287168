//! sunsafe - host for a blynk-connected smart clothesline.
//!
//! polls the light/rain/status pins, relays manual and auto-mode commands,
//! keeps a session history and serves a small dashboard.

pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod pins;
pub mod poller;
pub mod sensors;
pub mod service;
pub mod transport;
pub mod web;

pub use domain::{AppState, ClotheslineStatus, SensorData};
pub use error::{DecodeError, ServiceError, TransportError};
pub use history::{HistoryEntry, HistoryLog, ReadingContext};
pub use pins::VirtualPin;
pub use poller::Poller;
pub use service::ClotheslineService;
pub use transport::{BlynkTransport, PinTransport, PinValue};
