//! virtual pin map for the clothesline controller.
//!
//! the firmware publishes each sensor and actuator on a fixed blynk virtual
//! pin. the table is static for the lifetime of the process.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VirtualPin {
    LightIntensity,
    RainIntensity,
    ClotheslineStatus,
    /// write 1 to push the line out ("keluar")
    KeluarControl,
    /// write 1 to pull the line in ("masuk")
    MasukControl,
    AutoMode,
}

impl VirtualPin {
    pub const ALL: [VirtualPin; 6] = [
        VirtualPin::LightIntensity,
        VirtualPin::RainIntensity,
        VirtualPin::ClotheslineStatus,
        VirtualPin::KeluarControl,
        VirtualPin::MasukControl,
        VirtualPin::AutoMode,
    ];

    /// remote identifier used in the broker's query string
    pub const fn id(self) -> &'static str {
        match self {
            VirtualPin::LightIntensity => "v0",
            VirtualPin::RainIntensity => "v1",
            VirtualPin::ClotheslineStatus => "v2",
            VirtualPin::KeluarControl => "v3",
            VirtualPin::MasukControl => "v4",
            VirtualPin::AutoMode => "v5",
        }
    }

    /// semantic name, as consumers reference it
    pub const fn name(self) -> &'static str {
        match self {
            VirtualPin::LightIntensity => "LIGHT_INTENSITY",
            VirtualPin::RainIntensity => "RAIN_INTENSITY",
            VirtualPin::ClotheslineStatus => "CLOTHESLINE_STATUS",
            VirtualPin::KeluarControl => "KELUAR_CONTROL",
            VirtualPin::MasukControl => "MASUK_CONTROL",
            VirtualPin::AutoMode => "AUTO_MODE",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|pin| pin.name() == name)
    }
}

impl fmt::Display for VirtualPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// one row of the lookup table served to the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct PinBinding {
    pub name: &'static str,
    pub pin: &'static str,
}

pub fn pin_table() -> Vec<PinBinding> {
    VirtualPin::ALL
        .into_iter()
        .map(|pin| PinBinding { name: pin.name(), pin: pin.id() })
        .collect()
}
