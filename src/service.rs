//! ==============================================================================
//! service.rs - consumer-facing clothesline service
//! ==============================================================================
//!
//! purpose:
//!     the one handle the dashboard talks to. bundles the pin transport, the
//!     shared history log and the command dispatcher, and hands out pollers
//!     bound to the same transport and log.
//!
//! relationships:
//!     - used by: main.rs (construction, polling), web.rs (every handler)
//!     - uses: sensors.rs, commands.rs, history.rs, poller.rs
//!
//! ```text
//!     fetch_snapshot           -> sensors  -> transport
//!     extend / retract / auto  -> commands -> transport, then history
//!     poller()                 -> Poller   -> sensors, then history
//!
//!     Clone-able: every clone shares the same transport and history.
//! ```
//!
//! ==============================================================================

use crate::commands::CommandDispatcher;
use crate::domain::SensorData;
use crate::error::Result;
use crate::history::{HistoryEntry, HistoryLog};
use crate::poller::Poller;
use crate::sensors;
use crate::transport::PinTransport;

use std::sync::Arc;

#[derive(Clone)]
pub struct ClotheslineService {
    transport: Arc<dyn PinTransport>,
    history: HistoryLog,
    commands: CommandDispatcher,
}

impl ClotheslineService {
    pub fn new(transport: Arc<dyn PinTransport>, history: HistoryLog) -> Self {
        let commands = CommandDispatcher::new(Arc::clone(&transport), history.clone());
        Self { transport, history, commands }
    }

    pub fn with_manual_lockout(mut self, enabled: bool) -> Self {
        self.commands = self.commands.with_manual_lockout(enabled);
        self
    }

    /// one consistent reading; does not touch history
    pub async fn fetch_snapshot(&self) -> Result<SensorData> {
        sensors::fetch_snapshot(self.transport.as_ref()).await
    }

    pub async fn extend(&self) -> Result<()> {
        self.commands.extend().await
    }

    pub async fn retract(&self) -> Result<()> {
        self.commands.retract().await
    }

    pub async fn set_auto_mode(&self, enabled: bool) -> Result<()> {
        self.commands.set_auto_mode(enabled).await
    }

    /// history snapshot, newest first
    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.history.list().await
    }

    pub fn history_log(&self) -> &HistoryLog {
        &self.history
    }

    /// a fresh, idle poller sharing this service's transport and history
    pub fn poller(&self) -> Poller {
        Poller::new(Arc::clone(&self.transport), self.history.clone())
    }
}
