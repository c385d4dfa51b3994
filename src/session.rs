//! Caller-owned application state: current configuration, last run, and a
//! bounded history of past runs.
//!
//! The simulation core never touches a [`Session`]. Front ends create one,
//! feed each finished run into [`Session::record`], and decide themselves
//! whether to persist the serialized history.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::runner::SimulationOutcome;

/// Number of runs kept by default.
pub const HISTORY_CAPACITY: usize = 50;

/// Summary of one finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the run was recorded.
    pub date: NaiveDateTime,
    /// Caller-chosen label (preset name, scenario file, ...).
    pub label: String,
    /// Site country of the run; selects the currency its cost is shown in.
    #[serde(default)]
    pub country_code: String,
    pub cost: f64,
    /// PV energy (kWh).
    pub pv: f64,
    pub comfort: f64,
    pub co2_saved_kg: f64,
}

/// Most recent runs, oldest first, bounded to a fixed capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl History {
    /// Creates an empty history keeping at most `capacity` entries.
    ///
    /// A capacity of zero keeps nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(HISTORY_CAPACITY)),
            capacity,
        }
    }

    /// Appends an entry, dropping the oldest once full.
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Most recently recorded entry.
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryEntry;
    type IntoIter = std::collections::vec_deque::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Application state of one interactive or batch session.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Configuration used for the next run.
    pub config: ScenarioConfig,
    /// Outcome of the most recent run.
    pub last_run: Option<SimulationOutcome>,
    pub history: History,
}

impl Session {
    pub fn new(config: ScenarioConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Stores `outcome` as the last run and appends its summary to history.
    ///
    /// Returns the summary that was appended.
    pub fn record(
        &mut self,
        label: impl Into<String>,
        outcome: SimulationOutcome,
        at: NaiveDateTime,
    ) -> HistoryEntry {
        let kpis = &outcome.kpis;
        let entry = HistoryEntry {
            date: at,
            label: label.into(),
            country_code: self.config.site.country_code.clone(),
            cost: kpis.total_cost,
            pv: kpis.total_pv_kwh,
            comfort: kpis.avg_comfort,
            co2_saved_kg: kpis.co2_saved_kg,
        };
        self.history.push(entry.clone());
        self.last_run = Some(outcome);
        tracing::debug!(label = %entry.label, entries = self.history.len(), "run recorded");
        entry
    }
}
