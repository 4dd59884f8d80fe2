//! Committed changes and per-tick summaries handed to observers.

use ep_core::{ActivityId, AgentId, HealthId, LocationId, Tick};
use ep_world::{TestStatus, WorldState};

use crate::Field;

/// One field of one agent, before and after a commit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Health { from: HealthId, to: HealthId },
    Quarantine { from: bool, to: bool },
    Testing { from: TestStatus, to: TestStatus },
    Activity { from: ActivityId, to: ActivityId },
    Location { from: LocationId, to: LocationId },
}

impl Change {
    pub fn field_name(&self) -> &'static str {
        match self {
            Change::Health { .. } => "health",
            Change::Quarantine { .. } => "quarantine",
            Change::Testing { .. } => "testing",
            Change::Activity { .. } => "activity",
            Change::Location { .. } => "location",
        }
    }

    /// `(from, to)` rendered with the world's labels.
    pub fn labels(&self, world: &WorldState) -> (String, String) {
        match *self {
            Change::Health { from, to } => (world.health.name(from).to_owned(), world.health.name(to).to_owned()),
            Change::Quarantine { from, to } => (from.to_string(), to.to_string()),
            Change::Testing { from, to } => (from.label().to_owned(), to.label().to_owned()),
            Change::Activity { from, to } => (
                world.activities.name(from.index()).to_owned(),
                world.activities.name(to.index()).to_owned(),
            ),
            Change::Location { from, to } => (from.0.to_string(), to.0.to_string()),
        }
    }
}

/// A committed change, in commit order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    pub tick:   Tick,
    pub agent:  AgentId,
    /// The request field that produced it.
    pub field:  Field,
    pub change: Change,
}

/// Counters for one executed tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick:          Tick,
    /// Requests taken into the resolve phase.
    pub requests:      usize,
    pub overridden:    usize,
    pub merged:        usize,
    /// Changes actually committed (no-ops excluded).
    pub committed:     usize,
    /// Movement requests dropped because the agent died this tick.
    pub dropped:       usize,
    pub notifications: usize,
}
