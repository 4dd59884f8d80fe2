//! Validating builder for [`WorldState`].
//!
//! # Usage
//!
//! ```rust
//! use ep_core::{ActivityId, AgeClassId, Labels};
//! use ep_world::{AgentSpec, Coord, HealthModel, HealthState, WorldBuilder};
//!
//! let health = HealthModel::new(
//!     vec![HealthState::new("S").susceptible(), HealthState::new("I").infectious(1.0)],
//!     &[("S", "I")],
//! ).unwrap();
//! let mut b = WorldBuilder::new(
//!     Labels::new("activity", ["house"]).unwrap(),
//!     Labels::new("location type", ["house"]).unwrap(),
//!     Labels::new("age class", ["adult"]).unwrap(),
//!     health,
//! );
//! let home = b.add_location(ep_core::LocationTypeId(0), Coord::new(0.0, 0.0), None);
//! b.add_agent(AgentSpec::new(AgeClassId(0), ActivityId(0), home).permit(ActivityId(0), [home]));
//! let world = b.build().unwrap();
//! assert_eq!(world.agent_count(), 1);
//! ```

use ep_core::{ActivityId, AgeClassId, AgentId, HealthId, Labels, LocationId, LocationTypeId, Tick};

use crate::agent::{AgentStore, TestStatus};
use crate::health::HealthModel;
use crate::location::{Coord, LocationStore};
use crate::{WorldError, WorldResult, WorldState};

// ── AgentSpec ─────────────────────────────────────────────────────────────────

/// Initial state of one agent.
#[derive(Clone, Debug)]
pub struct AgentSpec {
    pub age_class: AgeClassId,
    pub activity:  ActivityId,
    pub location:  LocationId,
    /// `None` means the health model's initial state.
    pub health:    Option<HealthId>,
    pub permitted: Vec<(ActivityId, Vec<LocationId>)>,
}

impl AgentSpec {
    pub fn new(age_class: AgeClassId, activity: ActivityId, location: LocationId) -> Self {
        Self { age_class, activity, location, health: None, permitted: Vec::new() }
    }

    /// Allow `locations` for `activity`.  Repeated calls accumulate.
    pub fn permit(mut self, activity: ActivityId, locations: impl IntoIterator<Item = LocationId>) -> Self {
        self.permitted.push((activity, locations.into_iter().collect()));
        self
    }

    pub fn with_health(mut self, health: HealthId) -> Self {
        self.health = Some(health);
        self
    }
}

// ── WorldBuilder ──────────────────────────────────────────────────────────────

pub struct WorldBuilder {
    activities:     Labels,
    location_types: Labels,
    age_classes:    Labels,
    health:         HealthModel,
    locations:      LocationStore,
    agents:         Vec<AgentSpec>,
}

impl WorldBuilder {
    pub fn new(activities: Labels, location_types: Labels, age_classes: Labels, health: HealthModel) -> Self {
        Self {
            activities,
            location_types,
            age_classes,
            health,
            locations: LocationStore::new(),
            agents: Vec::new(),
        }
    }

    pub fn activities(&self) -> &Labels {
        &self.activities
    }

    pub fn location_types(&self) -> &Labels {
        &self.location_types
    }

    pub fn age_classes(&self) -> &Labels {
        &self.age_classes
    }

    pub fn health(&self) -> &HealthModel {
        &self.health
    }

    pub fn location_count(&self) -> usize {
        self.locations.count
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Add a location; ids are assigned sequentially from 0.
    pub fn add_location(&mut self, kind: LocationTypeId, coord: Coord, capacity: Option<u32>) -> LocationId {
        self.locations.push(kind, coord, capacity)
    }

    /// Add an agent; ids are assigned sequentially from 0.  Validation is
    /// deferred to [`build`](Self::build).
    pub fn add_agent(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId(self.agents.len() as u32);
        self.agents.push(spec);
        id
    }

    /// Validate everything and construct the store.
    ///
    /// # Errors
    ///
    /// Any out-of-range id, a location kind outside the location-type
    /// labels, or an initial location outside the agent's permitted set for
    /// its initial activity.
    pub fn build(self) -> WorldResult<WorldState> {
        let n_activities = self.activities.len();

        for (i, &kind) in self.locations.kind.iter().enumerate() {
            if kind.index() >= self.location_types.len() {
                return Err(WorldError::Config(format!(
                    "location {i} has unknown type {kind}"
                )));
            }
        }

        let mut agents = AgentStore::new(self.agents.len());
        let mut locations = self.locations;

        for (i, spec) in self.agents.into_iter().enumerate() {
            let id = AgentId(i as u32);
            if spec.age_class.index() >= self.age_classes.len() {
                return Err(WorldError::Config(format!("{id} has unknown age class {}", spec.age_class)));
            }
            if spec.activity.index() >= n_activities {
                return Err(WorldError::Config(format!("{id} has unknown activity {}", spec.activity)));
            }
            if !locations.contains(spec.location) {
                return Err(WorldError::Config(format!(
                    "{id} references nonexistent {}",
                    spec.location
                )));
            }
            let health = spec.health.unwrap_or_else(|| self.health.initial_state());
            if self.health.get(health).is_none() {
                return Err(WorldError::Config(format!("{id} has unknown health state {health}")));
            }

            let mut per_activity: Vec<Vec<LocationId>> = vec![Vec::new(); n_activities];
            for (activity, locs) in spec.permitted {
                if activity.index() >= n_activities {
                    return Err(WorldError::Config(format!(
                        "{id} has permitted locations for unknown activity {activity}"
                    )));
                }
                for loc in locs {
                    if !locations.contains(loc) {
                        return Err(WorldError::Config(format!(
                            "{id} permits nonexistent {loc} for activity {:?}",
                            self.activities.name(activity.index())
                        )));
                    }
                    per_activity[activity.index()].push(loc);
                }
            }
            for set in &mut per_activity {
                set.sort_unstable();
                set.dedup();
            }
            if per_activity[spec.activity.index()].binary_search(&spec.location).is_err() {
                return Err(WorldError::NotPermitted {
                    agent:    id,
                    activity: spec.activity,
                    location: spec.location,
                });
            }

            agents.age_class.push(spec.age_class);
            agents.activity.push(spec.activity);
            agents.location.push(spec.location);
            agents.health.push(health);
            agents.health_since.push(Tick::ZERO);
            agents.testing.push(TestStatus::Untested);
            agents.quarantined.push(false);
            agents.push_permitted(per_activity);

            if !self.health.is_dead(health) {
                locations.enter(spec.location, id);
            }
        }

        Ok(WorldState::from_parts(
            self.activities,
            self.location_types,
            self.age_classes,
            self.health,
            agents,
            locations,
        ))
    }
}
