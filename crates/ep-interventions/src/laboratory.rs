//! `Laboratory` — turns bookings into results.
//!
//! Booked (`notify.testing.booked`) → sampled after a delay that depends on
//! whether the agent is symptomatic when booked → result decided from the
//! health state at sampling time → reported after the result delay as
//! `request.testing.result`.  Disabling the laboratory refuses new bookings;
//! samples and results already in the pipeline still complete.

use std::collections::BTreeSet;

use tracing::debug;

use ep_bus::{Module, ModuleContext, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{AgentId, DeferredQueue, HealthId};
use ep_world::HealthModel;

use crate::config::{check_delay, check_probability, state_mask};
use crate::{InterventionResult, LaboratoryConfig};

pub struct Laboratory {
    config:      LaboratoryConfig,
    detectable:  Vec<bool>,
    symptomatic: Vec<bool>,
    samples:     DeferredQueue<AgentId>,
    results:     DeferredQueue<(AgentId, bool)>,
    /// Agents between booking and reported result.
    in_progress: BTreeSet<AgentId>,
}

impl Laboratory {
    pub fn new(config: LaboratoryConfig, health: &HealthModel) -> InterventionResult<Self> {
        check_probability("prob_false_positive", config.prob_false_positive)?;
        check_probability("prob_false_negative", config.prob_false_negative)?;
        check_delay("sampling_delay_days_symptomatic", config.sampling_delay_days_symptomatic)?;
        check_delay("sampling_delay_days_no_symptoms", config.sampling_delay_days_no_symptoms)?;
        check_delay("result_delay_days", config.result_delay_days)?;
        let detectable = state_mask(health, &config.detectable_states)?;
        let symptomatic = state_mask(health, &config.symptomatic_states)?;
        Ok(Self {
            config,
            detectable,
            symptomatic,
            samples: DeferredQueue::new(),
            results: DeferredQueue::new(),
            in_progress: BTreeSet::new(),
        })
    }

    pub fn in_progress(&self) -> usize {
        self.in_progress.len()
    }

    /// Draw a test outcome for an agent currently in `health`.
    fn outcome(&self, health: HealthId, ctx: &mut ModuleContext<'_>) -> bool {
        if self.detectable[health.index()] {
            ctx.rng.gen_bool(1.0 - self.config.prob_false_negative)
        } else {
            ctx.rng.gen_bool(self.config.prob_false_positive)
        }
    }

    fn book(&mut self, agent: AgentId, ctx: &mut ModuleContext<'_>) {
        if !ctx.is_enabled() || !self.in_progress.insert(agent) {
            return;
        }
        let days = if self.symptomatic[ctx.world.health_of(agent).index()] {
            self.config.sampling_delay_days_symptomatic
        } else {
            self.config.sampling_delay_days_no_symptoms
        };
        let delay = ctx.clock.ticks_for_days_f64(days);
        self.samples.push(ctx.tick() + delay, agent);
        debug!(tick = ctx.tick().0, agent = %agent, delay, "sample scheduled");
    }

    fn take_samples(&mut self, ctx: &mut ModuleContext<'_>) {
        let now = ctx.tick();
        let delay = ctx.clock.ticks_for_days_f64(self.config.result_delay_days);
        for agent in self.samples.drain_due(now) {
            if ctx.world.is_dead(agent) {
                self.in_progress.remove(&agent);
                continue;
            }
            let positive = self.outcome(ctx.world.health_of(agent), ctx);
            self.results.push(now + delay, (agent, positive));
        }
    }

    fn report(&mut self, ctx: &mut ModuleContext<'_>) -> usize {
        let mut reported = 0;
        for (agent, positive) in self.results.drain_due(ctx.tick()) {
            self.in_progress.remove(&agent);
            if ctx.world.is_dead(agent) {
                continue;
            }
            ctx.emit(Request::TestResult { agent, positive });
            reported += 1;
        }
        reported
    }
}

impl Module for Laboratory {
    fn name(&self) -> &str {
        "laboratory"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Intervention
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec!["notify.time.tick", "notify.testing.booked"]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match *msg {
            Notification::Tick { .. } => {
                self.take_samples(ctx);
                let reported = self.report(ctx);
                if reported > 0 {
                    debug!(tick = ctx.tick().0, reported, "test results");
                }
            }
            Notification::TestBooked { agent } => self.book(agent, ctx),
            _ => {}
        }
        Ok(())
    }
}
