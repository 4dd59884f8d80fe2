//! Test booking policies: random population screening and symptomatic
//! self-referral.  Both only emit `request.testing.book_test`; the
//! laboratory picks up from `notify.testing.booked`.

use std::collections::BTreeSet;

use tracing::debug;

use ep_bus::{Module, ModuleContext, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{AgentId, DeferredQueue};
use ep_world::{HealthModel, WorldState};

use crate::config::{check_delay, check_probability, state_mask};
use crate::{InterventionResult, RandomTestingConfig, SymptomaticTestingConfig};

/// Emit `BookTest` for every due agent still alive and not already booked.
fn flush_bookings(queue: &mut DeferredQueue<AgentId>, pending: &mut BTreeSet<AgentId>, ctx: &mut ModuleContext<'_>) -> usize {
    let world: &WorldState = ctx.world;
    let mut sent = 0;
    for agent in queue.drain_due(ctx.tick()) {
        pending.remove(&agent);
        if world.is_dead(agent) || world.testing_of(agent).is_booked() {
            continue;
        }
        ctx.emit(Request::BookTest { agent });
        sent += 1;
    }
    sent
}

// ── RandomTesting ─────────────────────────────────────────────────────────────

/// Invites a fixed number of randomly chosen agents each midnight.
pub struct RandomTesting {
    config:  RandomTestingConfig,
    queue:   DeferredQueue<AgentId>,
    pending: BTreeSet<AgentId>,
}

impl RandomTesting {
    pub fn new(config: RandomTestingConfig) -> InterventionResult<Self> {
        check_delay("invitation_delay_days", config.invitation_delay_days)?;
        Ok(Self { config, queue: DeferredQueue::new(), pending: BTreeSet::new() })
    }

    /// Invitations waiting to turn into bookings.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn invite(&mut self, ctx: &mut ModuleContext<'_>) {
        let world = ctx.world;
        let pool: Vec<AgentId> = world
            .agents
            .agent_ids()
            .filter(|&a| !world.is_dead(a) && !world.testing_of(a).is_booked() && !self.pending.contains(&a))
            .collect();
        let delay = ctx.clock.ticks_for_days_f64(self.config.invitation_delay_days);
        let due = ctx.tick() + delay;
        let picked = ctx.rng.sample_indices(pool.len(), self.config.tests_per_day as usize);
        for &i in &picked {
            self.queue.push(due, pool[i]);
            self.pending.insert(pool[i]);
        }
        debug!(tick = ctx.tick().0, invited = picked.len(), "random testing invitations");
    }
}

impl Module for RandomTesting {
    fn name(&self) -> &str {
        "random_testing"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick", "notify.time.midnight"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match msg {
            Notification::Tick { .. } => {
                flush_bookings(&mut self.queue, &mut self.pending, ctx);
            }
            Notification::Midnight { .. } if ctx.is_enabled() => {
                self.invite(ctx);
                // A zero delay books on the invitation tick itself.
                flush_bookings(&mut self.queue, &mut self.pending, ctx);
            }
            _ => {}
        }
        Ok(())
    }
}

// ── SymptomaticTesting ────────────────────────────────────────────────────────

/// Books a test, with some probability, for agents entering a symptomatic
/// state from a non-symptomatic one.
pub struct SymptomaticTesting {
    config:      SymptomaticTestingConfig,
    symptomatic: Vec<bool>,
    queue:       DeferredQueue<AgentId>,
    pending:     BTreeSet<AgentId>,
}

impl SymptomaticTesting {
    pub fn new(config: SymptomaticTestingConfig, health: &HealthModel) -> InterventionResult<Self> {
        check_probability("probability", config.probability)?;
        check_delay("onset_to_booking_days", config.onset_to_booking_days)?;
        let symptomatic = state_mask(health, &config.symptomatic_states)?;
        Ok(Self { config, symptomatic, queue: DeferredQueue::new(), pending: BTreeSet::new() })
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}

impl Module for SymptomaticTesting {
    fn name(&self) -> &str {
        "symptomatic_testing"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick", "notify.agent.health"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match *msg {
            Notification::Tick { .. } => {
                flush_bookings(&mut self.queue, &mut self.pending, ctx);
            }
            Notification::Health { agent, from, to } => {
                if !ctx.is_enabled() || self.pending.contains(&agent) {
                    return Ok(());
                }
                if self.symptomatic[from.index()] || !self.symptomatic[to.index()] {
                    return Ok(());
                }
                if ctx.rng.gen_bool(self.config.probability) {
                    let delay = ctx.clock.ticks_for_days_f64(self.config.onset_to_booking_days);
                    self.queue.push(ctx.tick() + delay, agent);
                    self.pending.insert(agent);
                    debug!(tick = ctx.tick().0, agent = %agent, delay, "symptomatic booking scheduled");
                }
            }
            _ => {}
        }
        Ok(())
    }
}
