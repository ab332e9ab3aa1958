//! Scheduler configuration.
//!
//! Grid shape, annealing parameters and the two semantic switches
//! ([`Exclusivity`], [`ScopeDiscovery`]). Deserializes from partial input:
//! missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};
use crate::models::{Exclusivity, Period};

/// How constraints learn which activities they gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeDiscovery {
    /// Every constraint is seeded with all activities before construction,
    /// so hard constraints gate even the first placement.
    #[default]
    Eager,
    /// Scope grows only as constraints observe placed activities; a hard
    /// constraint cannot block an activity it has never seen.
    Lazy,
}

/// Scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Number of days in the week.
    pub days: u32,
    /// First teaching hour of a day.
    pub day_start_hour: u32,
    /// End of the teaching day (exclusive hour).
    pub day_end_hour: u32,
    /// Granularity of legal start minutes within an hour.
    pub slot_minutes: u32,
    /// Annealing iteration budget.
    pub max_iterations: usize,
    /// Starting temperature.
    pub initial_temperature: f64,
    /// Geometric cooling factor per iteration.
    pub cooling_rate: f64,
    /// Search stops once the temperature drops to this.
    pub min_temperature: f64,
    /// PRNG seed.
    pub seed: u64,
    /// Room-only or site-wide conflict semantics.
    pub exclusivity: Exclusivity,
    /// Constraint scope discovery.
    pub scope_discovery: ScopeDiscovery,
    /// Optional wall-clock limit for the annealing loop (ms).
    ///
    /// Runs that hit it are no longer reproducible from the seed alone.
    pub time_limit_ms: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            days: 5,
            day_start_hour: 8,
            day_end_hour: 16,
            slot_minutes: 60,
            max_iterations: 10_000,
            initial_temperature: 100.0,
            cooling_rate: 0.995,
            min_temperature: 0.1,
            seed: 42,
            exclusivity: Exclusivity::PerRoom,
            scope_discovery: ScopeDiscovery::Eager,
            time_limit_ms: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of days.
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Sets the teaching hours `[start, end)`.
    pub fn with_hours(mut self, start: u32, end: u32) -> Self {
        self.day_start_hour = start;
        self.day_end_hour = end;
        self
    }

    /// Sets the start-minute granularity.
    pub fn with_slot_minutes(mut self, minutes: u32) -> Self {
        self.slot_minutes = minutes;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Sets the cooling factor.
    pub fn with_cooling_rate(mut self, rate: f64) -> Self {
        self.cooling_rate = rate;
        self
    }

    /// Sets the PRNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the conflict semantics.
    pub fn with_exclusivity(mut self, exclusivity: Exclusivity) -> Self {
        self.exclusivity = exclusivity;
        self
    }

    /// Sets constraint scope discovery.
    pub fn with_scope_discovery(mut self, scope: ScopeDiscovery) -> Self {
        self.scope_discovery = scope;
        self
    }

    /// Sets a wall-clock limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Checks the configuration for consistency.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(TimetableError::InvalidConfig(msg));
        if self.days == 0 {
            return fail("days must be at least 1".into());
        }
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return fail(format!(
                "teaching hours {}..{} are not a valid range within 0..24",
                self.day_start_hour, self.day_end_hour
            ));
        }
        if self.slot_minutes == 0 || 60 % self.slot_minutes != 0 {
            return fail(format!(
                "slot_minutes {} must divide 60",
                self.slot_minutes
            ));
        }
        if !(self.initial_temperature > 0.0) {
            return fail("initial_temperature must be positive".into());
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return fail(format!("cooling_rate {} must be in (0, 1)", self.cooling_rate));
        }
        if !(self.min_temperature >= 0.0) {
            return fail("min_temperature must not be negative".into());
        }
        Ok(())
    }

    /// Every legal start period, day by day.
    pub fn grid(&self) -> Vec<Period> {
        let mut periods = Vec::new();
        for day in 0..self.days {
            for hour in self.day_start_hour..self.day_end_hour {
                for minute in (0..60).step_by(self.slot_minutes.max(1) as usize) {
                    periods.push(Period::new(day, hour, minute));
                }
            }
        }
        periods
    }

    /// Whether `duration_minutes` from `period` stay inside one teaching day.
    ///
    /// Out-of-range hours and minutes never fit.
    pub fn fits(&self, period: Period, duration_minutes: u32) -> bool {
        if period.day >= self.days || period.hour >= 24 || period.minute >= 60 {
            return false;
        }
        let start = period.minute_of_day();
        start >= i64::from(self.day_start_hour) * 60
            && start + i64::from(duration_minutes) <= i64::from(self.day_end_hour) * 60
    }
}
