//! ==============================================================================
//! transport.rs - virtual pin read/write against the blynk cloud
//! ==============================================================================
//!
//! purpose:
//!     the leaf of the system. one call = one http round trip to the broker's
//!     external api. no retries, no batching, no timeout; whatever the broker
//!     says is handed back untouched.
//!
//! ```text
//!     GET {base}/external/api/get?token={token}&{pin}          -> raw text
//!     GET {base}/external/api/update?token={token}&{pin}={val} -> empty body
//!
//!     token and value are percent-encoded into the query.
//! ```
//!
//! relationships:
//!     - used by: sensors.rs (reads), commands.rs (writes), poller.rs
//!     - implemented for tests by: tests/common (scripted MockTransport)
//!
//! ==============================================================================

use crate::config::BrokerConfig;
use crate::error::TransportError;
use crate::pins::VirtualPin;

use async_trait::async_trait;
use std::fmt;
use tracing::{trace, warn};

/// value written to a pin: the broker accepts numbers or strings
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PinValue {
    Number(i64),
    Text(String),
}

impl fmt::Display for PinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinValue::Number(n) => write!(f, "{}", n),
            PinValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PinValue {
    fn from(n: i64) -> Self {
        PinValue::Number(n)
    }
}

impl From<bool> for PinValue {
    fn from(on: bool) -> Self {
        PinValue::Number(i64::from(on))
    }
}

impl From<&str> for PinValue {
    fn from(s: &str) -> Self {
        PinValue::Text(s.to_string())
    }
}

/// the seam between the clothesline core and the broker
#[async_trait]
pub trait PinTransport: Send + Sync {
    /// raw payload of `pin`, exactly as received
    async fn read_pin(&self, pin: VirtualPin) -> Result<String, TransportError>;

    async fn write_pin(&self, pin: VirtualPin, value: PinValue) -> Result<(), TransportError>;
}

// ==============================================================================
// blynk http transport
// ==============================================================================

pub struct BlynkTransport {
    client: reqwest::Client,
    base_url: String,
    auth_token: String,
}

impl BlynkTransport {
    pub fn new(base_url: impl Into<String>, auth_token: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("sunsafe-host/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: auth_token.into(),
        })
    }

    pub fn from_config(config: &BrokerConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.base_url(), config.auth_token.clone())
    }

    /// `?token=..&v1`: the pin goes in as a bare key
    fn get_request(&self, pin: VirtualPin) -> reqwest::Result<reqwest::Request> {
        let mut request = self.client.get(format!("{}/external/api/get", self.base_url)).build()?;
        request
            .url_mut()
            .query_pairs_mut()
            .append_pair("token", &self.auth_token)
            .append_key_only(pin.id());
        Ok(request)
    }

    /// `?token=..&v1=val`, with the value percent-encoded
    fn update_request(&self, pin: VirtualPin, value: &PinValue) -> reqwest::Result<reqwest::Request> {
        let mut request = self.client.get(format!("{}/external/api/update", self.base_url)).build()?;
        request
            .url_mut()
            .query_pairs_mut()
            .append_pair("token", &self.auth_token)
            .append_pair(pin.id(), &value.to_string());
        Ok(request)
    }

    /// send one request and turn anything but a 2xx into a TransportError
    async fn round_trip(
        &self,
        pin: VirtualPin,
        request: reqwest::Result<reqwest::Request>,
    ) -> Result<reqwest::Response, TransportError> {
        let sent = match request {
            Ok(request) => self.client.execute(request).await,
            Err(e) => Err(e),
        };
        let response = sent.map_err(|source| {
            warn!(%pin, error = %source, "broker unreachable");
            TransportError::Request { pin, source }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%pin, status = status.as_u16(), "broker rejected request");
            return Err(TransportError::Status { pin, status: status.as_u16() });
        }
        Ok(response)
    }
}

#[async_trait]
impl PinTransport for BlynkTransport {
    async fn read_pin(&self, pin: VirtualPin) -> Result<String, TransportError> {
        let response = self.round_trip(pin, self.get_request(pin)).await?;
        let body = response.text().await.map_err(|source| {
            warn!(%pin, error = %source, "failed to read pin body");
            TransportError::Request { pin, source }
        })?;
        trace!(%pin, raw = %body, "pin read");
        Ok(body)
    }

    async fn write_pin(&self, pin: VirtualPin, value: PinValue) -> Result<(), TransportError> {
        self.round_trip(pin, self.update_request(pin, &value)).await?;
        trace!(%pin, %value, "pin written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_external_api_layout() {
        let transport = BlynkTransport::new("https://blynk.cloud/", "tok123").unwrap();
        assert_eq!(
            transport.get_request(VirtualPin::RainIntensity).unwrap().url().as_str(),
            "https://blynk.cloud/external/api/get?token=tok123&v1"
        );
        assert_eq!(
            transport.update_request(VirtualPin::AutoMode, &PinValue::from(false)).unwrap().url().as_str(),
            "https://blynk.cloud/external/api/update?token=tok123&v5=0"
        );
    }

    #[test]
    fn reserved_characters_stay_inside_the_value() {
        let transport = BlynkTransport::new("https://blynk.cloud", "tok123").unwrap();
        let request = transport
            .update_request(VirtualPin::LightIntensity, &PinValue::from("5&v3=1#x"))
            .unwrap();
        assert_eq!(request.url().query(), Some("token=tok123&v0=5%26v3%3D1%23x"));
        assert_eq!(request.url().fragment(), None);
    }

    #[test]
    fn pin_values_render_like_the_broker_expects() {
        assert_eq!(PinValue::from(true).to_string(), "1");
        assert_eq!(PinValue::from(42_i64).to_string(), "42");
        assert_eq!(PinValue::from("moving").to_string(), "moving");
    }
}
