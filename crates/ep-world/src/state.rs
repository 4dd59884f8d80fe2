//! `WorldState` — the authoritative store read by every module and written
//! only by the engine's commit phase.

use ep_core::{ActivityId, AgeClassId, AgentId, HealthId, Labels, LocationId, LocationTypeId, Tick};

use crate::agent::{AgentStore, TestStatus};
use crate::health::HealthModel;
use crate::location::{Coord, LocationStore};
use crate::{WorldError, WorldResult};

// ── Field values ──────────────────────────────────────────────────────────────

/// The value of one mutable agent field.  Used both as the argument to
/// [`WorldState::apply`] and as its return (the previous value).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    Health(HealthId),
    Quarantine(bool),
    Testing(TestStatus),
    Activity(ActivityId),
    Location(LocationId),
}

impl FieldValue {
    /// Column name used by output writers.
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldValue::Health(_) => "health",
            FieldValue::Quarantine(_) => "quarantine",
            FieldValue::Testing(_) => "testing",
            FieldValue::Activity(_) => "activity",
            FieldValue::Location(_) => "location",
        }
    }
}

// ── Snapshots ─────────────────────────────────────────────────────────────────

/// Copy of one agent's state at the time of the call.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    pub id:           AgentId,
    pub age_class:    AgeClassId,
    pub activity:     ActivityId,
    pub location:     LocationId,
    pub health:       HealthId,
    pub health_since: Tick,
    pub testing:      TestStatus,
    pub quarantined:  bool,
    pub dead:         bool,
}

/// Copy of one location's state at the time of the call.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationSnapshot {
    pub id:        LocationId,
    pub kind:      LocationTypeId,
    pub coord:     Coord,
    pub capacity:  Option<u32>,
    pub occupants: Vec<AgentId>,
}

/// Ids that [`WorldState::get_state`] can resolve.
pub trait StateKey: Copy {
    type Snapshot;

    fn snapshot(self, world: &WorldState) -> WorldResult<Self::Snapshot>;
}

impl StateKey for AgentId {
    type Snapshot = AgentSnapshot;

    fn snapshot(self, world: &WorldState) -> WorldResult<AgentSnapshot> {
        world.check_agent(self)?;
        let i = self.index();
        let a = &world.agents;
        Ok(AgentSnapshot {
            id:           self,
            age_class:    a.age_class[i],
            activity:     a.activity[i],
            location:     a.location[i],
            health:       a.health[i],
            health_since: a.health_since[i],
            testing:      a.testing[i],
            quarantined:  a.quarantined[i],
            dead:         world.health.is_dead(a.health[i]),
        })
    }
}

impl StateKey for LocationId {
    type Snapshot = LocationSnapshot;

    fn snapshot(self, world: &WorldState) -> WorldResult<LocationSnapshot> {
        if !world.locations.contains(self) {
            return Err(WorldError::UnknownLocation(self));
        }
        let i = self.index();
        let l = &world.locations;
        Ok(LocationSnapshot {
            id:        self,
            kind:      l.kind[i],
            coord:     l.coord[i],
            capacity:  l.capacity[i],
            occupants: l.occupants(self).iter().copied().collect(),
        })
    }
}

// ── WorldState ────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct WorldState {
    pub activities:     Labels,
    pub location_types: Labels,
    pub age_classes:    Labels,
    pub health:         HealthModel,
    pub agents:         AgentStore,
    pub locations:      LocationStore,
    /// Agents per health state, indexed by `HealthId`.
    health_counts:      Vec<u64>,
}

impl WorldState {
    pub(crate) fn from_parts(
        activities: Labels,
        location_types: Labels,
        age_classes: Labels,
        health: HealthModel,
        agents: AgentStore,
        locations: LocationStore,
    ) -> Self {
        let mut health_counts = vec![0u64; health.len()];
        for h in &agents.health {
            health_counts[h.index()] += 1;
        }
        Self { activities, location_types, age_classes, health, agents, locations, health_counts }
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Snapshot of an agent or a location.
    pub fn get_state<K: StateKey>(&self, key: K) -> WorldResult<K::Snapshot> {
        key.snapshot(self)
    }

    pub fn agent_count(&self) -> usize {
        self.agents.count
    }

    pub fn location_count(&self) -> usize {
        self.locations.count
    }

    #[inline]
    pub fn health_of(&self, agent: AgentId) -> HealthId {
        self.agents.health[agent.index()]
    }

    #[inline]
    pub fn activity_of(&self, agent: AgentId) -> ActivityId {
        self.agents.activity[agent.index()]
    }

    #[inline]
    pub fn location_of(&self, agent: AgentId) -> LocationId {
        self.agents.location[agent.index()]
    }

    #[inline]
    pub fn is_dead(&self, agent: AgentId) -> bool {
        self.health.is_dead(self.health_of(agent))
    }

    #[inline]
    pub fn is_terminal(&self, agent: AgentId) -> bool {
        self.health.is_terminal(self.health_of(agent))
    }

    #[inline]
    pub fn is_quarantined(&self, agent: AgentId) -> bool {
        self.agents.quarantined[agent.index()]
    }

    #[inline]
    pub fn testing_of(&self, agent: AgentId) -> TestStatus {
        self.agents.testing[agent.index()]
    }

    /// Number of agents currently in `state`.
    pub fn health_count(&self, state: HealthId) -> u64 {
        self.health_counts.get(state.index()).copied().unwrap_or(0)
    }

    /// Agents per health state, indexed by `HealthId`.
    pub fn health_counts(&self) -> &[u64] {
        &self.health_counts
    }

    /// `true` when every live agent is listed at exactly its own location
    /// and no dead agent is listed anywhere.
    pub fn occupancy_consistent(&self) -> bool {
        let mut listed = 0usize;
        for loc in self.locations.location_ids() {
            for &agent in self.locations.occupants(loc) {
                if !self.agents.contains(agent) || self.is_dead(agent) || self.location_of(agent) != loc {
                    return false;
                }
                listed += 1;
            }
        }
        let live = self.agents.agent_ids().filter(|&a| !self.is_dead(a)).count();
        listed == live
    }

    pub(crate) fn check_agent(&self, agent: AgentId) -> WorldResult<()> {
        if self.agents.contains(agent) { Ok(()) } else { Err(WorldError::UnknownAgent(agent)) }
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Write one field of `agent` and return its previous value.
    ///
    /// Enforces what the store itself owns: ids in range, legal health
    /// edges, and the occupancy index.  Permitted-location checks span two
    /// fields and are left to the caller.
    pub fn apply(&mut self, tick: Tick, agent: AgentId, value: FieldValue) -> WorldResult<FieldValue> {
        self.check_agent(agent)?;
        let i = agent.index();
        match value {
            FieldValue::Health(to) => {
                if self.health.get(to).is_none() {
                    return Err(WorldError::UnknownHealth(to));
                }
                let from = self.agents.health[i];
                if from == to {
                    return Ok(FieldValue::Health(from));
                }
                if !self.health.is_legal(from, to) {
                    return Err(WorldError::IllegalTransition {
                        agent,
                        from: self.health.name(from).to_owned(),
                        to:   self.health.name(to).to_owned(),
                    });
                }
                self.agents.health[i] = to;
                self.agents.health_since[i] = tick;
                self.health_counts[from.index()] -= 1;
                self.health_counts[to.index()] += 1;
                if self.health.is_dead(to) && !self.health.is_dead(from) {
                    let here = self.agents.location[i];
                    self.locations.leave(here, agent);
                }
                Ok(FieldValue::Health(from))
            }
            FieldValue::Activity(to) => {
                if to.index() >= self.activities.len() {
                    return Err(WorldError::UnknownActivity(to));
                }
                let from = std::mem::replace(&mut self.agents.activity[i], to);
                Ok(FieldValue::Activity(from))
            }
            FieldValue::Location(to) => {
                if !self.locations.contains(to) {
                    return Err(WorldError::UnknownLocation(to));
                }
                let from = std::mem::replace(&mut self.agents.location[i], to);
                if from != to && !self.is_dead(agent) {
                    self.locations.leave(from, agent);
                    self.locations.enter(to, agent);
                }
                Ok(FieldValue::Location(from))
            }
            FieldValue::Testing(to) => {
                let from = std::mem::replace(&mut self.agents.testing[i], to);
                Ok(FieldValue::Testing(from))
            }
            FieldValue::Quarantine(to) => {
                let from = std::mem::replace(&mut self.agents.quarantined[i], to);
                Ok(FieldValue::Quarantine(from))
            }
        }
    }
}
