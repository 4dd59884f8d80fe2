//! Structure-of-Arrays storage for agent state.
//!
//! Every `Vec` field has exactly `count` elements; the `AgentId` value is the
//! index into all of them:
//!
//! ```ignore
//! let here = store.location[agent.index()];  // O(1), cache-friendly
//! ```
//!
//! Fields are `pub` for reading; the only writer is
//! [`WorldState::apply`](crate::WorldState::apply), called by the engine
//! during commit.

use ep_core::{ActivityId, AgeClassId, AgentId, HealthId, LocationId, Tick};

// ── TestStatus ────────────────────────────────────────────────────────────────

/// Where an agent stands in the testing pipeline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TestStatus {
    #[default]
    Untested,
    /// A test was booked at `since` and no result has been recorded yet.
    Booked { since: Tick },
    Positive { at: Tick },
    Negative { at: Tick },
}

impl TestStatus {
    #[inline]
    pub fn is_booked(self) -> bool {
        matches!(self, TestStatus::Booked { .. })
    }

    /// Short label used by output writers.
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Untested => "untested",
            TestStatus::Booked { .. } => "booked",
            TestStatus::Positive { .. } => "positive",
            TestStatus::Negative { .. } => "negative",
        }
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    pub age_class: Vec<AgeClassId>,

    // ── Movement state ────────────────────────────────────────────────────
    pub activity: Vec<ActivityId>,

    /// Current location.  Kept for dead agents, who are nevertheless absent
    /// from the occupancy index.
    pub location: Vec<LocationId>,

    // ── Health state ──────────────────────────────────────────────────────
    pub health: Vec<HealthId>,

    /// Tick at which the current health state was entered.
    pub health_since: Vec<Tick>,

    // ── Intervention state ────────────────────────────────────────────────
    pub testing: Vec<TestStatus>,

    pub quarantined: Vec<bool>,

    /// Per agent, per activity (indexed by `ActivityId`), the sorted set of
    /// locations the agent may occupy while doing that activity.
    permitted: Vec<Vec<Vec<LocationId>>>,
}

impl AgentStore {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.count as u32).map(AgentId)
    }

    #[inline]
    pub fn contains(&self, agent: AgentId) -> bool {
        agent.index() < self.count
    }

    /// Locations `agent` may occupy while doing `activity` (empty when none).
    pub fn permitted(&self, agent: AgentId, activity: ActivityId) -> &[LocationId] {
        self.permitted
            .get(agent.index())
            .and_then(|per| per.get(activity.index()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_permitted(&self, agent: AgentId, activity: ActivityId, location: LocationId) -> bool {
        self.permitted(agent, activity).binary_search(&location).is_ok()
    }

    pub(crate) fn new(count: usize) -> Self {
        Self {
            count,
            age_class:    Vec::with_capacity(count),
            activity:     Vec::with_capacity(count),
            location:     Vec::with_capacity(count),
            health:       Vec::with_capacity(count),
            health_since: Vec::with_capacity(count),
            testing:      Vec::with_capacity(count),
            quarantined:  Vec::with_capacity(count),
            permitted:    Vec::with_capacity(count),
        }
    }

    pub(crate) fn push_permitted(&mut self, per_activity: Vec<Vec<LocationId>>) {
        self.permitted.push(per_activity);
    }
}
