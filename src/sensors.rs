//! ==============================================================================
//! sensors.rs - sensor aggregation and pin payload decoding
//! ==============================================================================
//!
//! purpose:
//!     turns four raw pin reads into one SensorData snapshot.
//!     reads are issued one after another in a fixed order
//!     (light -> rain -> status -> auto mode). any failure, transport or
//!     decode, fails the whole snapshot.
//!
//! ```text
//!     this module never writes history. who logs a reading is the caller's
//!     business (see poller.rs).
//! ```
//!
//! ==============================================================================

use crate::domain::SensorData;
use crate::error::{DecodeError, Result};
use crate::pins::VirtualPin;
use crate::transport::PinTransport;

/// read light, rain, status and auto mode, then decode them together
pub async fn fetch_snapshot(transport: &dyn PinTransport) -> Result<SensorData> {
    let light = transport.read_pin(VirtualPin::LightIntensity).await?;
    let rain = transport.read_pin(VirtualPin::RainIntensity).await?;
    let status = transport.read_pin(VirtualPin::ClotheslineStatus).await?;
    let auto_mode = transport.read_pin(VirtualPin::AutoMode).await?;

    Ok(SensorData {
        light_intensity: decode_intensity(VirtualPin::LightIntensity, &light)?,
        rain_intensity: decode_intensity(VirtualPin::RainIntensity, &rain)?,
        clothesline_status: status,
        auto_mode_active: decode_auto_mode(&auto_mode),
    })
}

/// base-10 integer payload
///
/// surrounding whitespace is ignored. a decimal payload ("42.7") keeps its
/// integer part, the way the device's own dashboards show it. anything else,
/// exponents included, is a DecodeError.
pub fn decode_intensity(pin: VirtualPin, raw: &str) -> std::result::Result<i32, DecodeError> {
    let trimmed = raw.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (trimmed, None),
    };

    let digits = whole.strip_prefix(['+', '-']).unwrap_or(whole);
    let whole_ok = is_digits(digits);
    let fraction_ok = fraction.map_or(true, is_digits);

    match whole.parse::<i32>() {
        Ok(value) if whole_ok && fraction_ok => Ok(value),
        _ => Err(DecodeError { pin, raw: raw.to_string() }),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// only the literal "1" means on
pub fn decode_auto_mode(raw: &str) -> bool {
    raw == "1"
}
