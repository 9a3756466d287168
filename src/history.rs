//! ==============================================================================
//! history.rs - session activity log
//! ==============================================================================
//!
//! purpose:
//!     append-only, newest-first, in-memory record of what happened:
//!     sensor readings from the poller and successful manual commands.
//!     volatile on purpose; a restart starts with an empty log.
//!
//! sharing:
//!     HistoryLog is a cheap Clone handle over Arc<RwLock<..>>, constructed
//!     once in main.rs and handed to the command dispatcher and the poller.
//!     each test builds its own.
//!
//! ==============================================================================

use crate::domain::SensorData;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// free text, e.g. "Manual - Keluar" or "Sensor Reading"
    pub action: String,
    /// assigned by the log at insertion
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rain_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_status: Option<String>,
}

/// optional sensor context attached to an entry
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReadingContext {
    pub light_level: Option<i32>,
    pub rain_level: Option<i32>,
    pub system_status: Option<String>,
}

impl From<&SensorData> for ReadingContext {
    fn from(data: &SensorData) -> Self {
        Self {
            light_level: Some(data.light_intensity),
            rain_level: Some(data.rain_intensity),
            system_status: Some(data.clothesline_status.clone()),
        }
    }
}

#[derive(Clone, Default)]
pub struct HistoryLog {
    entries: Arc<RwLock<VecDeque<HistoryEntry>>>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// stamp and prepend a new entry
    pub async fn append(&self, action: impl Into<String>, context: ReadingContext) {
        let mut entries = self.entries.write().await;
        // stamped under the lock so timestamps never run backwards in the log
        let entry = HistoryEntry {
            action: action.into(),
            timestamp: Utc::now(),
            light_level: context.light_level,
            rain_level: context.rain_level,
            system_status: context.system_status,
        };
        debug!(action = %entry.action, "history entry saved");
        entries.push_front(entry);
    }

    /// snapshot, newest first
    pub async fn list(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

// ==============================================================================
// calendar grouping for the history view
// ==============================================================================

#[derive(Clone, Debug, Serialize)]
pub struct DayGroup {
    /// local calendar date
    pub date: NaiveDate,
    pub entries: Vec<HistoryEntry>,
}

/// group a snapshot by local calendar day, newest day first
///
/// order inside a day is the order of `entries`.
pub fn group_by_day(entries: &[HistoryEntry]) -> Vec<DayGroup> {
    let mut days: BTreeMap<NaiveDate, Vec<HistoryEntry>> = BTreeMap::new();
    for entry in entries {
        let date = entry.timestamp.with_timezone(&Local).date_naive();
        days.entry(date).or_default().push(entry.clone());
    }
    days.into_iter()
        .rev()
        .map(|(date, entries)| DayGroup { date, entries })
        .collect()
}
