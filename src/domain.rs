use serde::{Deserialize, Serialize};

/// one fully decoded reading of the sensor/status pins
///
/// never partially populated: the aggregator either fills every field or
/// returns an error. replaced wholesale on each poll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    /// light intensity in percent (0-100 nominal, not clamped)
    pub light_intensity: i32,
    /// rain intensity in percent (0-100 nominal, not clamped)
    pub rain_intensity: i32,
    /// raw status string from the device, case preserved
    pub clothesline_status: String,
    pub auto_mode_active: bool,
}

impl Default for SensorData {
    fn default() -> Self {
        Self {
            light_intensity: 0,
            rain_intensity: 0,
            clothesline_status: "unknown".to_string(),
            auto_mode_active: false,
        }
    }
}

impl SensorData {
    pub fn status(&self) -> ClotheslineStatus {
        ClotheslineStatus::classify(&self.clothesline_status)
    }
}

/// what the dashboard makes of the open-ended status string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClotheslineStatus {
    Extended,
    Retracted,
    Moving,
    Unknown,
}

impl ClotheslineStatus {
    pub fn classify(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "keluar" => Self::Extended,
            "masuk" => Self::Retracted,
            "moving" => Self::Moving,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extended => "extended",
            Self::Retracted => "retracted",
            Self::Moving => "moving",
            Self::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Extended => "Clothesline Extended",
            Self::Retracted => "Clothesline Retracted",
            Self::Moving => "Clothesline Moving",
            Self::Unknown => "Status Unknown",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Extended => "Your laundry is currently outside",
            Self::Retracted => "Your laundry is currently protected",
            Self::Moving => "The system is changing position",
            Self::Unknown => "Cannot determine current status",
        }
    }
}

/// dashboard view state shared between the poller and the web server
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub sensor: SensorData,
    /// unix timestamp (ms) of the last successful fetch
    pub last_update: Option<i64>,
}

impl AppState {
    pub fn apply_snapshot(&mut self, data: SensorData) {
        self.sensor = data;
        self.last_update = Some(chrono::Utc::now().timestamp_millis());
    }
}

/// share of a gauge ring to fill, in whole percent
///
/// the reading itself is never clamped; only the ring is.
pub fn gauge_percent(value: i32, max: i32) -> u8 {
    if max <= 0 {
        return 0;
    }
    let pct = (f64::from(value) / f64::from(max) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
