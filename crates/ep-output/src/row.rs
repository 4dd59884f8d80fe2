//! Plain data row types written by output backends.

/// One committed change of one agent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeRow {
    pub tick:           u64,
    pub unix_time_secs: i64,
    pub agent:          u32,
    /// `health`, `quarantine`, `testing`, `activity` or `location`.
    pub field:          &'static str,
    /// Previous value, rendered with the world's labels.
    pub from:           String,
    pub to:             String,
}

/// Engine counters for one executed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:           u64,
    pub unix_time_secs: i64,
    pub requests:       u64,
    pub overridden:     u64,
    pub merged:         u64,
    pub committed:      u64,
    pub dropped:        u64,
    pub notifications:  u64,
}

/// Number of agents in one health state at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCountRow {
    pub tick:  u64,
    pub state: String,
    pub count: u64,
}
