//! ==============================================================================
//! error.rs - typed failures for the clothesline core
//! ==============================================================================
//!
//! purpose:
//!     the library never hands back stringly errors. callers (the web layer,
//!     the poller) match on these to decide between a toast, a 409 or a
//!     swallowed tick.
//!
//! relationships:
//!     - raised by: transport.rs (TransportError), sensors.rs (DecodeError)
//!     - wrapped by: ServiceError, returned from sensors/commands/service
//!     - mapped to http status codes in: web.rs
//!
//! ==============================================================================

use crate::pins::VirtualPin;
use thiserror::Error;

/// a single virtual-pin round trip did not complete
#[derive(Debug, Error)]
pub enum TransportError {
    /// broker answered, but not with a 2xx
    #[error("broker returned HTTP {status} for pin {pin}")]
    Status { pin: VirtualPin, status: u16 },

    /// broker unreachable or the body could not be read
    #[error("request for pin {pin} failed")]
    Request {
        pin: VirtualPin,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    pub fn pin(&self) -> VirtualPin {
        match self {
            Self::Status { pin, .. } | Self::Request { pin, .. } => *pin,
        }
    }
}

/// a numeric pin payload that is not a number (empty payloads included)
#[derive(Debug, Error)]
#[error("pin {pin} returned {raw:?}, expected an integer")]
pub struct DecodeError {
    pub pin: VirtualPin,
    pub raw: String,
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// manual extend/retract refused because the device is in auto mode
    #[error("manual control is disabled while auto mode is active")]
    AutoModeActive,
}

pub type Result<T> = std::result::Result<T, ServiceError>;
