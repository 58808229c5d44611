/// Persisted record shapes for chrome.storage.local: session history,
/// usage counters, and the raw usage-event log
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::tab_data::{Mode, SessionStatus, SplitSession};

/// Bound on the split-session history; oldest entries are evicted first
pub const SESSION_HISTORY_CAP: usize = 20;

/// Bound on the raw usage-event log
pub const USAGE_LOG_CAP: usize = 100;

/// Usage events echoed back in the stats summary
pub const RECENT_ACTIVITY_LEN: usize = 10;

/// Milliseconds-since-epoch timestamp converted to a whole UTC day
pub fn epoch_day_from_ms(timestamp_ms: f64) -> i64 {
    (timestamp_ms / 86_400_000.0).floor() as i64
}

/// Bounded FIFO history of completed splits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionStore {
    sessions: Vec<SplitSession>,
}

impl SessionStore {
    pub fn new() -> SessionStore {
        SessionStore::default()
    }

    pub fn sessions(&self) -> &[SplitSession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a session, evicting the oldest beyond the cap
    pub fn push(&mut self, session: SplitSession) {
        self.sessions.push(session);
        if self.sessions.len() > SESSION_HISTORY_CAP {
            let excess = self.sessions.len() - SESSION_HISTORY_CAP;
            self.sessions.drain(..excess);
        }
    }

    pub fn get(&self, session_id: &str) -> Option<&SplitSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Mark a session closed and return the ids of its created tabs
    ///
    /// The record stays in the history; the caller closes the tabs.
    pub fn close(&mut self, session_id: &str) -> Option<Vec<i32>> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.status == SessionStatus::Active)?;
        session.status = SessionStatus::Closed;
        Some(session.created_tabs.iter().map(|tab| tab.id).collect())
    }

    pub fn remove(&mut self, session_id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != session_id);
        self.sessions.len() < before
    }
}

/// One raw split event kept for local analytics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    pub timestamp_ms: f64,
    pub split_count: u32,
    pub mode: Option<Mode>,
    pub source_url: String,
    pub target_urls: Vec<String>,
}

/// Bounded FIFO log of raw usage events
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLog {
    events: Vec<UsageEvent>,
}

impl UsageLog {
    pub fn events(&self) -> &[UsageEvent] {
        &self.events
    }

    pub fn push(&mut self, event: UsageEvent) {
        self.events.push(event);
        if self.events.len() > USAGE_LOG_CAP {
            let excess = self.events.len() - USAGE_LOG_CAP;
            self.events.drain(..excess);
        }
    }
}

/// Aggregated usage counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UsageStats {
    pub total_splits: u64,
    pub splits_by_count: HashMap<u32, u64>,
    pub splits_by_mode: HashMap<String, u64>,
    /// Whole UTC day of the last recorded split
    pub last_used_day: Option<i64>,
    pub streak_days: u32,
}

impl UsageStats {
    /// Record one completed split on the given day
    ///
    /// The streak grows only when the day advances by exactly one;
    /// repeats on the same day leave it alone, gaps reset it to 1.
    pub fn record_split(&mut self, split_count: u32, mode: Option<&Mode>, today: i64) {
        self.total_splits += 1;
        *self.splits_by_count.entry(split_count).or_insert(0) += 1;
        if let Some(mode) = mode {
            *self
                .splits_by_mode
                .entry(mode.as_str().to_string())
                .or_insert(0) += 1;
        }

        match self.last_used_day {
            Some(last) if last == today => {}
            Some(last) if today == last + 1 => {
                self.streak_days += 1;
                self.last_used_day = Some(today);
            }
            _ => {
                self.streak_days = 1;
                self.last_used_day = Some(today);
            }
        }
    }

    /// Condensed view for the settings page
    ///
    /// `log` contributes the trailing recent-activity slice.
    pub fn summary(&self, log: &UsageLog) -> StatsSummary {
        let total_tabs: u64 = self
            .splits_by_count
            .iter()
            .map(|(count, times)| u64::from(*count) * times)
            .sum();
        let average_split_count = if self.total_splits > 0 {
            total_tabs as f64 / self.total_splits as f64
        } else {
            0.0
        };

        let most_used_mode = self
            .splits_by_mode
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(mode, _)| mode.clone());

        let events = log.events();
        let recent_start = events.len().saturating_sub(RECENT_ACTIVITY_LEN);

        StatsSummary {
            total_splits: self.total_splits,
            average_split_count,
            most_used_mode,
            streak_days: self.streak_days,
            recent_activity: events[recent_start..].to_vec(),
        }
    }
}

/// Derived statistics shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_splits: u64,
    pub average_split_count: f64,
    pub most_used_mode: Option<String>,
    pub streak_days: u32,
    /// Trailing slice of the raw usage log, oldest first
    pub recent_activity: Vec<UsageEvent>,
}
