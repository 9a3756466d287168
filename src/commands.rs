//! ==============================================================================
//! commands.rs - manual and auto-mode control writes
//! ==============================================================================
//!
//! purpose:
//!     each command is one pin write followed, only on success, by one
//!     history entry. failures propagate untouched and leave no trace in the
//!     history. cached snapshots are not touched; the next poll is the
//!     source of truth.
//!
//! manual lockout:
//!     keeping manual buttons away from auto mode is normally the dashboard's
//!     job. with `lock_manual_in_auto` set, extend/retract first read the
//!     auto-mode pin and refuse with ServiceError::AutoModeActive.
//!
//! ==============================================================================

use crate::error::{Result, ServiceError};
use crate::history::{HistoryLog, ReadingContext};
use crate::pins::VirtualPin;
use crate::sensors::decode_auto_mode;
use crate::transport::{PinTransport, PinValue};

use std::sync::Arc;
use tracing::info;

pub const ACTION_KELUAR: &str = "Manual - Keluar";
pub const ACTION_MASUK: &str = "Manual - Masuk";
pub const ACTION_AUTO_ON: &str = "Auto mode enabled";
pub const ACTION_AUTO_OFF: &str = "Auto mode disabled";

#[derive(Clone)]
pub struct CommandDispatcher {
    transport: Arc<dyn PinTransport>,
    history: HistoryLog,
    lock_manual_in_auto: bool,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn PinTransport>, history: HistoryLog) -> Self {
        Self { transport, history, lock_manual_in_auto: false }
    }

    pub fn with_manual_lockout(mut self, enabled: bool) -> Self {
        self.lock_manual_in_auto = enabled;
        self
    }

    /// push the clothesline out
    pub async fn extend(&self) -> Result<()> {
        self.manual(VirtualPin::KeluarControl, ACTION_KELUAR).await
    }

    /// pull the clothesline in
    pub async fn retract(&self) -> Result<()> {
        self.manual(VirtualPin::MasukControl, ACTION_MASUK).await
    }

    pub async fn set_auto_mode(&self, enabled: bool) -> Result<()> {
        self.transport
            .write_pin(VirtualPin::AutoMode, PinValue::from(enabled))
            .await?;
        let action = if enabled { ACTION_AUTO_ON } else { ACTION_AUTO_OFF };
        self.history.append(action, ReadingContext::default()).await;
        info!(enabled, "auto mode set");
        Ok(())
    }

    async fn manual(&self, pin: VirtualPin, action: &'static str) -> Result<()> {
        if self.lock_manual_in_auto {
            let raw = self.transport.read_pin(VirtualPin::AutoMode).await?;
            if decode_auto_mode(&raw) {
                info!(%pin, "manual command refused: auto mode active");
                return Err(ServiceError::AutoModeActive);
            }
        }

        self.transport.write_pin(pin, PinValue::Number(1)).await?;
        self.history.append(action, ReadingContext::default()).await;
        info!(%pin, action, "manual command sent");
        Ok(())
    }
}
