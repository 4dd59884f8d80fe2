//! Movement restrictions: location closures, curfews and working from home.
//!
//! Each policy reviews the moves behavior queued during collect and answers
//! every move it forbids with home activity/location requests, which
//! outrank behavior under the default precedence.  Moves requested by
//! disease or intervention modules are never redirected, and agents already
//! somewhere forbidden stay until they next move.

use std::collections::BTreeSet;

use tracing::debug;

use ep_bus::{Envelope, Module, ModuleContext, ModuleError, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{ActivityId, AgentId, LocationId};
use ep_world::WorldState;

use crate::config::{check_probability, location_type_mask};
use crate::{CurfewConfig, InterventionError, InterventionResult, LocationClosureConfig, WorkFromHomeConfig};

/// First permitted location for `home_activity`.
pub(crate) fn home_of(world: &WorldState, agent: AgentId, home_activity: ActivityId) -> ModuleResult<LocationId> {
    world.agents.permitted(agent, home_activity).first().copied().ok_or_else(|| {
        ModuleError::Invariant(format!("{agent} has no permitted location for the home activity"))
    })
}

/// Send home every agent whose behavior-requested move `forbidden` rejects.
/// Returns the number of agents redirected.
fn redirect_home(
    queued: &[Envelope],
    ctx: &mut ModuleContext<'_>,
    home_activity: ActivityId,
    forbidden: impl Fn(&WorldState, AgentId, LocationId) -> bool,
) -> ModuleResult<usize> {
    let world: &WorldState = ctx.world;
    let mut sent: BTreeSet<AgentId> = BTreeSet::new();
    for env in queued {
        if env.kind != ModuleKind::Behavior {
            continue;
        }
        let Request::Location { agent, to } = env.request else { continue };
        if sent.contains(&agent) || !forbidden(world, agent, to) {
            continue;
        }
        let home = home_of(world, agent, home_activity)?;
        if to == home {
            continue;
        }
        ctx.emit(Request::Activity { agent, to: home_activity });
        ctx.emit(Request::Location { agent, to: home });
        sent.insert(agent);
    }
    Ok(sent.len())
}

fn activity(world: &WorldState, name: &str) -> InterventionResult<ActivityId> {
    Ok(ActivityId(world.activities.require(name)?))
}

// ── LocationClosure ───────────────────────────────────────────────────────────

/// Keeps agents out of closed location types while enabled.
pub struct LocationClosure {
    home_activity: ActivityId,
    closed:        Vec<bool>,
}

impl LocationClosure {
    pub fn new(config: LocationClosureConfig, world: &WorldState) -> InterventionResult<Self> {
        if config.location_types.is_empty() {
            return Err(InterventionError::Config("location closure names no location types".into()));
        }
        Ok(Self {
            home_activity: activity(world, &config.home_activity)?,
            closed:        location_type_mask(world, &config.location_types)?,
        })
    }
}

impl Module for LocationClosure {
    fn name(&self) -> &str {
        "location_closure"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn handle(&mut self, _msg: &Notification, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }

    fn review(&mut self, queued: &[Envelope], ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        if !ctx.is_enabled() {
            return Ok(());
        }
        let closed = &self.closed;
        let sent = redirect_home(queued, ctx, self.home_activity, |world, _, to| {
            closed[world.locations.kind[to.index()].index()]
        })?;
        if sent > 0 {
            debug!(tick = ctx.tick().0, sent, "closed locations refused");
        }
        Ok(())
    }
}

// ── Curfew ────────────────────────────────────────────────────────────────────

/// Keeps agents out of some location types during a daily window.
pub struct Curfew {
    start_hour:    u32,
    end_hour:      u32,
    home_activity: ActivityId,
    covered:       Vec<bool>,
}

impl Curfew {
    pub fn new(config: CurfewConfig, world: &WorldState) -> InterventionResult<Self> {
        if config.start_hour > 23 || config.end_hour > 23 || config.start_hour == config.end_hour {
            return Err(InterventionError::Config(format!(
                "curfew hours must be distinct and within 0..=23, got {}..{}",
                config.start_hour, config.end_hour
            )));
        }
        Ok(Self {
            start_hour:    config.start_hour,
            end_hour:      config.end_hour,
            home_activity: activity(world, &config.home_activity)?,
            covered:       location_type_mask(world, &config.location_types)?,
        })
    }

    /// Whether the curfew applies during hour-of-day `hour`.
    pub fn in_force(&self, hour: u32) -> bool {
        if self.start_hour < self.end_hour {
            (self.start_hour..self.end_hour).contains(&hour)
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl Module for Curfew {
    fn name(&self) -> &str {
        "curfew"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        Vec::new()
    }

    fn handle(&mut self, _msg: &Notification, _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }

    fn review(&mut self, queued: &[Envelope], ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        let hour = ctx.clock.seconds_through_week() % 86_400 / 3_600;
        if !ctx.is_enabled() || !self.in_force(hour) {
            return Ok(());
        }
        let covered = &self.covered;
        let sent = redirect_home(queued, ctx, self.home_activity, |world, _, to| {
            covered[world.locations.kind[to.index()].index()]
        })?;
        if sent > 0 {
            debug!(tick = ctx.tick().0, hour, sent, "curfew");
        }
        Ok(())
    }
}

// ── WorkFromHome ──────────────────────────────────────────────────────────────

/// Each day, a share of the staff of some workplace types stays home.
pub struct WorkFromHome {
    probability:   f64,
    home_activity: ActivityId,
    /// Per agent: its workplace when that workplace's type is covered.
    workplace:     Vec<Option<LocationId>>,
    at_home:       Vec<bool>,
}

impl WorkFromHome {
    pub fn new(config: WorkFromHomeConfig, world: &WorldState) -> InterventionResult<Self> {
        check_probability("probability", config.probability)?;
        let work = activity(world, &config.work_activity)?;
        let covered = location_type_mask(world, &config.location_types)?;
        let workplace: Vec<Option<LocationId>> = world
            .agents
            .agent_ids()
            .map(|a| {
                world
                    .agents
                    .permitted(a, work)
                    .first()
                    .copied()
                    .filter(|l| covered[world.locations.kind[l.index()].index()])
            })
            .collect();
        Ok(Self {
            probability: config.probability,
            home_activity: activity(world, &config.home_activity)?,
            at_home: vec![false; workplace.len()],
            workplace,
        })
    }

    /// Agents told to work from home today.
    pub fn staying_home(&self) -> usize {
        self.at_home.iter().filter(|&&h| h).count()
    }

    fn redraw(&mut self, ctx: &mut ModuleContext<'_>) {
        for (i, place) in self.workplace.iter().enumerate() {
            self.at_home[i] = place.is_some() && ctx.rng.gen_bool(self.probability);
        }
        debug!(tick = ctx.tick().0, staying_home = self.staying_home(), "work from home draw");
    }
}

impl Module for WorkFromHome {
    fn name(&self) -> &str {
        "work_from_home"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.start_simulation", "notify.time.midnight"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        if matches!(msg, Notification::StartSimulation | Notification::Midnight { .. }) {
            self.redraw(ctx);
        }
        Ok(())
    }

    fn review(&mut self, queued: &[Envelope], ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        if !ctx.is_enabled() {
            return Ok(());
        }
        let (workplace, at_home) = (&self.workplace, &self.at_home);
        redirect_home(queued, ctx, self.home_activity, |_, agent, to| {
            at_home[agent.index()] && workplace[agent.index()] == Some(to)
        })?;
        Ok(())
    }
}
