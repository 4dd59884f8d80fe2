//! `MarkovBehavior` — per-tick activity sampling and location choice.

use tracing::debug;

use ep_bus::{Module, ModuleContext, ModuleError, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{ActivityId, AgentId, HealthId, LocationId};
use ep_world::WorldState;

use crate::{BehaviorError, BehaviorResult, TransitionMatrices};

/// How a location is picked from the permitted set for a new activity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LocationChoice {
    #[default]
    Uniform,
    /// Proportional to location capacity; locations without a capacity
    /// count as 1.
    CapacityWeighted,
}

#[derive(Clone, Debug, Default)]
pub struct MarkovConfig {
    pub location_choice: LocationChoice,

    /// Health states whose agents keep their activity and location (for
    /// example hospitalised).  Dead agents are always skipped.
    pub no_move_states: Vec<HealthId>,
}

pub struct MarkovBehavior {
    matrices: TransitionMatrices,
    config:   MarkovConfig,
}

impl MarkovBehavior {
    pub fn new(matrices: TransitionMatrices, config: MarkovConfig) -> Self {
        Self { matrices, config }
    }

    pub fn matrices(&self) -> &TransitionMatrices {
        &self.matrices
    }

    /// Check that the matrices cover exactly the world's activities and age
    /// classes.
    pub fn check_world(&self, world: &WorldState) -> BehaviorResult<()> {
        let activities = world.activities.len();
        if self.matrices.activity_count() != activities {
            return Err(BehaviorError::Matrix(format!(
                "matrices cover {} activities, world has {activities}",
                self.matrices.activity_count()
            )));
        }
        let age_classes = world.age_classes.len();
        if self.matrices.age_class_count() != age_classes {
            return Err(BehaviorError::Matrix(format!(
                "matrices cover {} age classes, world has {age_classes}",
                self.matrices.age_class_count()
            )));
        }
        Ok(())
    }

    fn choose_location(&self, ctx: &mut ModuleContext<'_>, candidates: &[LocationId]) -> Option<LocationId> {
        match self.config.location_choice {
            LocationChoice::Uniform => ctx.rng.choose(candidates).copied(),
            LocationChoice::CapacityWeighted => {
                let weights = capacity_weights(ctx.world, candidates);
                match ctx.rng.choose_weighted_index(&weights) {
                    Some(i) => Some(candidates[i]),
                    None => ctx.rng.choose(candidates).copied(),
                }
            }
        }
    }

    fn step_agents(&self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        let world = ctx.world;
        let bucket = self.matrices.bucket_for(ctx.clock.seconds_through_week());
        let mut moved = 0usize;

        for agent in world.agents.agent_ids() {
            if world.is_dead(agent) || self.config.no_move_states.contains(&world.health_of(agent)) {
                continue;
            }
            let current = world.activity_of(agent);
            let age_class = world.agents.age_class[agent.index()];
            let next = self
                .matrices
                .sample_next(age_class, bucket, current, ctx.rng)
                .ok_or_else(|| {
                    ModuleError::Invariant(format!(
                        "no transition row for {agent} (age class {age_class}, bucket {bucket}, activity {current})"
                    ))
                })?;
            if next == current {
                continue;
            }

            let candidates = world.agents.permitted(agent, next);
            let location = self.choose_location(ctx, candidates).ok_or_else(|| empty_set(world, agent, next))?;
            ctx.emit(Request::Activity { agent, to: next });
            ctx.emit(Request::Location { agent, to: location });
            moved += 1;
        }

        debug!(tick = ctx.tick().0, bucket, moved, "markov step");
        Ok(())
    }
}

fn capacity_weights(world: &WorldState, candidates: &[LocationId]) -> Vec<f64> {
    candidates
        .iter()
        .map(|l| world.locations.capacity[l.index()].unwrap_or(1) as f64)
        .collect()
}

fn empty_set(world: &WorldState, agent: AgentId, activity: ActivityId) -> ModuleError {
    ModuleError::Invariant(format!(
        "{agent} has no permitted location for activity {:?}",
        world.activities.name(activity.index())
    ))
}

impl Module for MarkovBehavior {
    fn name(&self) -> &str {
        "markov_behavior"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Behavior
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match msg {
            Notification::Tick { .. } => self.step_agents(ctx),
            _ => Ok(()),
        }
    }

    fn validate(&self, world: &WorldState) -> ModuleResult<()> {
        self.check_world(world).map_err(|e| ModuleError::Config(e.to_string()))
    }
}
