//! `Quarantine` — isolates agents with positive results and holds them at
//! home.
//!
//! - positive result, not quarantined → `request.quarantine.start`
//! - `notify.quarantine.start` → release scheduled after the default
//!   duration
//! - negative result while quarantined → release after the early-release
//!   delay
//! - after collect, each live quarantined agent gets home activity/location
//!   requests unless the tick takes it to an exempt location type (or keeps
//!   it at one), or another intervention is already moving it.  The home
//!   requests outrank behavior under the default precedence, so the agent
//!   stays put.

use std::collections::BTreeMap;

use tracing::{debug, info};

use ep_bus::{Envelope, Module, ModuleContext, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{ActivityId, AgentId, DeferredQueue, LocationId, Tick};
use ep_world::WorldState;

use crate::config::{check_delay, location_type_mask};
use crate::restrictions::home_of;
use crate::{InterventionResult, QuarantineConfig};

pub struct Quarantine {
    config:        QuarantineConfig,
    home_activity: ActivityId,
    exempt:        Vec<bool>,
    /// Quarantine start tick per agent currently isolated.  Releases carry
    /// the start tick they were scheduled for and are ignored once stale.
    started:       BTreeMap<AgentId, Tick>,
    releases:      DeferredQueue<(AgentId, Tick)>,
}

impl Quarantine {
    pub fn new(config: QuarantineConfig, world: &WorldState) -> InterventionResult<Self> {
        check_delay("default_duration_days", config.default_duration_days)?;
        check_delay("early_release_days", config.early_release_days)?;
        let home_activity = ActivityId(world.activities.require(&config.home_activity)?);
        let exempt = location_type_mask(world, &config.exempt_location_types)?;
        Ok(Self { config, home_activity, exempt, started: BTreeMap::new(), releases: DeferredQueue::new() })
    }

    pub fn home_activity(&self) -> ActivityId {
        self.home_activity
    }

    /// Agents this module has seen enter quarantine and not yet leave.
    pub fn isolated(&self) -> usize {
        self.started.len()
    }

    /// Releases scheduled and not yet due.
    pub fn pending_releases(&self) -> usize {
        self.releases.len()
    }

    fn schedule_release(&mut self, agent: AgentId, days: f64, ctx: &ModuleContext<'_>) {
        if let Some(&since) = self.started.get(&agent) {
            let due = ctx.tick() + ctx.clock.ticks_for_days_f64(days);
            self.releases.push(due, (agent, since));
        }
    }

    fn release_due(&mut self, ctx: &mut ModuleContext<'_>) {
        let mut sent: Vec<AgentId> = Vec::new();
        for (agent, since) in self.releases.drain_due(ctx.tick()) {
            if self.started.get(&agent) != Some(&since) || sent.contains(&agent) {
                continue;
            }
            if ctx.world.is_dead(agent) || !ctx.world.is_quarantined(agent) {
                continue;
            }
            ctx.emit(Request::StopQuarantine { agent });
            sent.push(agent);
        }
    }

    /// `true` when this tick takes the agent to an exempt location type,
    /// keeps it at one, or another intervention already moves it.
    fn leaves_alone(&self, world: &WorldState, agent: AgentId, queued: &[Envelope]) -> bool {
        let exempt = |loc: LocationId| self.exempt[world.locations.kind[loc.index()].index()];
        let mut moving = false;
        for env in queued {
            let Request::Location { agent: a, to } = env.request else { continue };
            if a != agent {
                continue;
            }
            if env.kind == ModuleKind::Intervention || exempt(to) {
                return true;
            }
            moving = true;
        }
        !moving && exempt(world.location_of(agent))
    }

    fn hold_at_home(&self, queued: &[Envelope], ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        if self.config.release_when_disabled && !ctx.is_enabled() {
            return Ok(());
        }
        let world: &WorldState = ctx.world;
        let mut held = 0usize;
        for agent in world.agents.agent_ids() {
            if !world.is_quarantined(agent) || world.is_dead(agent) {
                continue;
            }
            if self.leaves_alone(world, agent, queued) {
                continue;
            }
            let home = home_of(world, agent, self.home_activity)?;
            ctx.emit(Request::Activity { agent, to: self.home_activity });
            ctx.emit(Request::Location { agent, to: home });
            held += 1;
        }
        debug!(tick = ctx.tick().0, held, "quarantine overrides");
        Ok(())
    }
}

impl Module for Quarantine {
    fn name(&self) -> &str {
        "quarantine"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick", "notify.testing.result", "notify.quarantine.*"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match *msg {
            Notification::Tick { .. } => self.release_due(ctx),
            Notification::TestResult { agent, positive: true } => {
                if ctx.is_enabled() && !ctx.world.is_quarantined(agent) && !ctx.world.is_dead(agent) {
                    ctx.emit(Request::StartQuarantine { agent });
                }
            }
            Notification::TestResult { agent, positive: false } => {
                if ctx.world.is_quarantined(agent) {
                    self.schedule_release(agent, self.config.early_release_days, ctx);
                }
            }
            Notification::QuarantineStarted { agent } => {
                self.started.insert(agent, ctx.tick());
                self.schedule_release(agent, self.config.default_duration_days, ctx);
                info!(tick = ctx.tick().0, agent = %agent, "quarantine started");
            }
            Notification::QuarantineStopped { agent } => {
                self.started.remove(&agent);
                self.releases.retain(|&(a, _)| a != agent);
                info!(tick = ctx.tick().0, agent = %agent, "quarantine ended");
            }
            _ => {}
        }
        Ok(())
    }

    fn review(&mut self, queued: &[Envelope], ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        self.hold_at_home(queued, ctx)
    }
}
