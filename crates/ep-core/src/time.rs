//! Simulation time model.
//!
//! # Design
//!
//! Time is a monotonically increasing `Tick` counter.  The mapping to
//! calendar time is held in `SimClock`:
//!
//!   wall_time = start_unix_secs + tick * tick_duration_secs   (UTC)
//!
//! Integer ticks keep every duration exact; the calendar view (weekday,
//! midnight crossings) is derived on demand through `chrono`.
//!
//! The tick duration must divide one week so that weekly activity routines
//! repeat on a whole number of ticks.
//!
//! `SimClock` is also the run's tick *sequence*: it implements `Iterator`,
//! yields `Tick(0) .. Tick(total_ticks)` exactly once, and stays exhausted
//! afterwards.  A new run builds a new clock.

use std::fmt;
use std::iter::FusedIterator;

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::{CoreError, CoreResult};

pub const SECS_PER_DAY: i64 = 86_400;
pub const SECS_PER_WEEK: i64 = 7 * SECS_PER_DAY;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`, saturating at zero.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Forward-only tick sequence plus tick ↔ calendar conversions.
#[derive(Clone, Debug)]
pub struct SimClock {
    start_unix_secs:    i64,
    tick_duration_secs: u32,
    total_ticks:        u64,
    current:            Tick,
    started:            bool,
    exhausted:          bool,
}

impl SimClock {
    /// Create a clock of `total_ticks` steps starting at `start_unix_secs`.
    ///
    /// # Errors
    ///
    /// [`CoreError::Config`] if the tick duration is zero or does not divide
    /// a week, or if the run does not fit in the calendar.
    pub fn new(start_unix_secs: i64, tick_duration_secs: u32, total_ticks: u64) -> CoreResult<Self> {
        if tick_duration_secs == 0 {
            return Err(CoreError::Config("tick_duration_secs must be > 0".into()));
        }
        if SECS_PER_WEEK % tick_duration_secs as i64 != 0 {
            return Err(CoreError::Config(format!(
                "tick duration {tick_duration_secs}s does not divide one week ({SECS_PER_WEEK}s)"
            )));
        }
        let run_secs = (total_ticks as i128) * tick_duration_secs as i128;
        let end = start_unix_secs as i128 + run_secs;
        if end > i64::MAX as i128
            || DateTime::from_timestamp(start_unix_secs, 0).is_none()
            || DateTime::from_timestamp(end as i64, 0).is_none()
        {
            return Err(CoreError::Config(format!(
                "run of {total_ticks} ticks from {start_unix_secs} is outside the calendar range"
            )));
        }
        Ok(Self {
            start_unix_secs,
            tick_duration_secs,
            total_ticks,
            current: Tick::ZERO,
            started: false,
            exhausted: false,
        })
    }

    // ── Sequence state ────────────────────────────────────────────────────

    /// The tick most recently yielded (or `Tick(0)` before the first one).
    #[inline]
    pub fn current_tick(&self) -> Tick {
        self.current
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn tick_duration_secs(&self) -> u32 {
        self.tick_duration_secs
    }

    /// Ticks not yet yielded.
    pub fn ticks_remaining(&self) -> u64 {
        if self.exhausted {
            return 0;
        }
        let consumed = if self.started { self.current.0 + 1 } else { 0 };
        self.total_ticks.saturating_sub(consumed)
    }

    /// `true` while positioned on a tick whose calendar day differs from the
    /// previous tick's.  Tick 0 is never a midnight.
    pub fn is_midnight(&self) -> bool {
        if !self.started || self.exhausted || self.current == Tick::ZERO {
            return false;
        }
        self.day_index(self.current) != self.day_index(Tick(self.current.0 - 1))
    }

    /// `true` while positioned on the final tick of the run.
    pub fn is_last_tick(&self) -> bool {
        self.started && !self.exhausted && self.current.0 + 1 == self.total_ticks
    }

    // ── Calendar view ─────────────────────────────────────────────────────

    #[inline]
    pub fn unix_secs_at(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    /// Calendar time of `tick` in UTC.
    pub fn time_at(&self, tick: Tick) -> DateTime<Utc> {
        DateTime::from_timestamp(self.unix_secs_at(tick), 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Calendar time of the current tick.
    pub fn now(&self) -> DateTime<Utc> {
        self.time_at(self.current)
    }

    /// Days since the Unix epoch for `tick` (UTC calendar days).
    #[inline]
    pub fn day_index(&self, tick: Tick) -> i64 {
        self.unix_secs_at(tick).div_euclid(SECS_PER_DAY)
    }

    /// Seconds since Monday 00:00 of the current week.
    pub fn seconds_through_week(&self) -> u32 {
        let now = self.now();
        now.weekday().num_days_from_monday() * SECS_PER_DAY as u32 + now.num_seconds_from_midnight()
    }

    // ── Tick-count helpers ────────────────────────────────────────────────

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: u64) -> u64 {
        secs.div_ceil(self.tick_duration_secs as u64)
    }

    #[inline]
    pub fn ticks_for_hours(&self, hours: u64) -> u64 {
        self.ticks_for_secs(hours * 3_600)
    }

    #[inline]
    pub fn ticks_for_days(&self, days: u64) -> u64 {
        self.ticks_for_secs(days * SECS_PER_DAY as u64)
    }

    /// Fractional days → ticks, rounding up.
    pub fn ticks_for_days_f64(&self, days: f64) -> u64 {
        let secs = (days.max(0.0) * SECS_PER_DAY as f64).ceil() as u64;
        self.ticks_for_secs(secs)
    }
}

impl Iterator for SimClock {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.exhausted {
            return None;
        }
        if self.started {
            self.current = Tick(self.current.0 + 1);
        } else {
            self.started = true;
        }
        if self.current.0 >= self.total_ticks {
            self.exhausted = true;
            return None;
        }
        Some(self.current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.ticks_remaining() as usize;
        (n, Some(n))
    }
}

impl FusedIterator for SimClock {}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.current, self.now().format("%a %Y-%m-%d %H:%M"))
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Run configuration consumed once at start-up.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Unix timestamp (UTC) of tick 0.
    pub start_unix_secs: i64,

    /// Seconds per tick.  Must divide one week.
    pub tick_duration_secs: u32,

    /// Total ticks in the run.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Optional hard cap on executed ticks; the run ends early (still
    /// emitting its end notification) once reached.
    pub max_ticks: Option<u64>,
}

impl SimConfig {
    /// A run of `days` simulated days.
    pub fn for_days(start_unix_secs: i64, tick_duration_secs: u32, days: u64, seed: u64) -> Self {
        let total_ticks = if tick_duration_secs == 0 {
            0
        } else {
            (days * SECS_PER_DAY as u64).div_ceil(tick_duration_secs as u64)
        };
        Self { start_unix_secs, tick_duration_secs, total_ticks, seed, max_ticks: None }
    }

    /// Ticks that will actually execute: `total_ticks` capped by `max_ticks`.
    #[inline]
    pub fn effective_ticks(&self) -> u64 {
        match self.max_ticks {
            Some(cap) => cap.min(self.total_ticks),
            None => self.total_ticks,
        }
    }

    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.effective_ticks())
    }

    /// Construct the run's clock, validating the time parameters.
    pub fn make_clock(&self) -> CoreResult<SimClock> {
        SimClock::new(self.start_unix_secs, self.tick_duration_secs, self.effective_ticks())
    }
}
