//! Hourly simulation clock and calendar-based season selection.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::weather::Season;

/// A simulation clock that hands out hourly steps over a fixed horizon.
///
/// Optionally anchored to a start date so steps can be mapped to wall-clock
/// timestamps for display. The anchor never affects the physics.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new(3);
/// let mut steps = Vec::new();
///
/// clock.run(|step| steps.push(step));
/// assert_eq!(steps, vec![0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct Clock {
    current: usize,
    horizon_hours: usize,
    start: Option<NaiveDateTime>,
}

impl Clock {
    /// Creates an unanchored clock over `horizon_hours` steps.
    pub fn new(horizon_hours: usize) -> Self {
        Self {
            current: 0,
            horizon_hours,
            start: None,
        }
    }

    /// Anchors step 0 to midnight of `date`.
    pub fn starting_on(mut self, date: NaiveDate) -> Self {
        self.start = Some(date.and_time(chrono::NaiveTime::MIN));
        self
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(step)` - The step index before advancing
    /// * `None` - Once the horizon is exhausted
    pub fn tick(&mut self) -> Option<usize> {
        if self.current < self.horizon_hours {
            let step = self.current;
            self.current += 1;
            Some(step)
        } else {
            None
        }
    }

    /// Runs `f` for each remaining step.
    pub fn run(&mut self, mut f: impl FnMut(usize)) {
        while let Some(step) = self.tick() {
            f(step);
        }
    }

    /// Wall-clock time of `step`, if the clock is anchored.
    pub fn timestamp(&self, step: usize) -> Option<NaiveDateTime> {
        let hours = i64::try_from(step).ok()?;
        self.start?.checked_add_signed(TimeDelta::try_hours(hours)?)
    }

    /// Number of steps not yet handed out.
    pub fn remaining(&self) -> usize {
        self.horizon_hours - self.current
    }
}

/// Picks the weather season for a run.
///
/// An explicit season wins; otherwise the month of `start_date` decides;
/// otherwise winter. The host clock is never consulted, so a scenario
/// replays identically on any day.
pub fn resolve_season(explicit: Option<Season>, start_date: Option<NaiveDate>) -> Season {
    explicit
        .or_else(|| start_date.map(Season::from_date))
        .unwrap_or_default()
}
