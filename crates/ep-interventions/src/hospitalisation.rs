//! `Hospitalisation` — moves agents into hospital while their health state
//! calls for it.
//!
//! - `notify.agent.health` into a hospital state → a ward is picked from the
//!   agent's permitted hospital locations
//! - every tick, each admitted agent gets hospital activity/location
//!   requests, so behavior cannot move it out
//! - leaving the hospital states → one round of home requests on the next
//!   tick; death simply ends the stay
//!
//! Disabling the policy stops new admissions.  Patients already admitted
//! stay until discharged.

use std::collections::BTreeMap;

use tracing::{debug, info};

use ep_bus::{Module, ModuleContext, ModuleError, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{ActivityId, AgentId, LocationId, LocationTypeId};
use ep_world::WorldState;

use crate::config::state_mask;
use crate::restrictions::home_of;
use crate::{HospitalisationConfig, InterventionResult};

pub struct Hospitalisation {
    hospital_activity: ActivityId,
    home_activity:     ActivityId,
    hospital_type:     LocationTypeId,
    hospital_state:    Vec<bool>,
    /// Ward per admitted agent.
    admitted:          BTreeMap<AgentId, LocationId>,
    discharged:        Vec<AgentId>,
}

impl Hospitalisation {
    pub fn new(config: HospitalisationConfig, world: &WorldState) -> InterventionResult<Self> {
        Ok(Self {
            hospital_activity: ActivityId(world.activities.require(&config.hospital_activity)?),
            home_activity:     ActivityId(world.activities.require(&config.home_activity)?),
            hospital_type:     LocationTypeId(world.location_types.require(&config.hospital_location_type)?),
            hospital_state:    state_mask(&world.health, &config.hospital_states)?,
            admitted:          BTreeMap::new(),
            discharged:        Vec::new(),
        })
    }

    pub fn admitted(&self) -> usize {
        self.admitted.len()
    }

    pub fn ward_of(&self, agent: AgentId) -> Option<LocationId> {
        self.admitted.get(&agent).copied()
    }

    fn admit(&mut self, agent: AgentId, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        let wards: Vec<LocationId> = wards(ctx.world, agent, self.hospital_activity, self.hospital_type).collect();
        let ward = *ctx
            .rng
            .choose(&wards)
            .ok_or_else(|| ModuleError::Invariant(format!("{agent} has no permitted hospital location")))?;
        self.admitted.insert(agent, ward);
        info!(tick = ctx.tick().0, agent = %agent, ward = %ward, "admitted to hospital");
        Ok(())
    }

    fn hold(&mut self, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        let world: &WorldState = ctx.world;
        for (&agent, &ward) in &self.admitted {
            if world.is_dead(agent) {
                continue;
            }
            ctx.emit(Request::Activity { agent, to: self.hospital_activity });
            ctx.emit(Request::Location { agent, to: ward });
        }
        for agent in self.discharged.drain(..) {
            if world.is_dead(agent) {
                continue;
            }
            ctx.emit(Request::Activity { agent, to: self.home_activity });
            ctx.emit(Request::Location { agent, to: home_of(world, agent, self.home_activity)? });
        }
        debug!(tick = ctx.tick().0, patients = self.admitted.len(), "hospital holds");
        Ok(())
    }
}

/// The agent's permitted locations for `activity` that are hospitals.
fn wards(
    world: &WorldState,
    agent: AgentId,
    activity: ActivityId,
    hospital: LocationTypeId,
) -> impl Iterator<Item = LocationId> + '_ {
    world
        .agents
        .permitted(agent, activity)
        .iter()
        .copied()
        .filter(move |l| world.locations.kind[l.index()] == hospital)
}

impl Module for Hospitalisation {
    fn name(&self) -> &str {
        "hospitalisation"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick", "notify.agent.health"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match *msg {
            Notification::Tick { .. } => self.hold(ctx)?,
            Notification::Health { agent, to, .. } => {
                if ctx.world.health.is_dead(to) {
                    self.admitted.remove(&agent);
                } else if self.hospital_state[to.index()] {
                    if ctx.is_enabled() && !self.admitted.contains_key(&agent) {
                        self.admit(agent, ctx)?;
                    }
                } else if self.admitted.remove(&agent).is_some() {
                    info!(tick = ctx.tick().0, agent = %agent, "discharged from hospital");
                    self.discharged.push(agent);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn validate(&self, world: &WorldState) -> ModuleResult<()> {
        let unplaced = world
            .agents
            .agent_ids()
            .find(|&a| wards(world, a, self.hospital_activity, self.hospital_type).next().is_none());
        match unplaced {
            Some(agent) => Err(ModuleError::Config(format!(
                "{agent} has no permitted location of the hospital type for the hospital activity"
            ))),
            None => Ok(()),
        }
    }
}
