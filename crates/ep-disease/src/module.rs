//! `DiseaseModule` — exposure and progression, evaluated on the committed
//! world state at the start of each tick.

use tracing::{debug, info};

use ep_bus::{Module, ModuleContext, ModuleKind, ModuleResult, Notification, Request};
use ep_core::{AgentId, Tick};
use ep_world::WorldState;

use crate::model::{exposure_probability, DiseaseModel, Rule};

pub struct DiseaseModule {
    model:     DiseaseModel,
    /// Per agent: tick at which a duration-ruled state ends.
    deadlines: Vec<Option<Tick>>,
}

impl DiseaseModule {
    pub fn new(model: DiseaseModel) -> Self {
        Self { model, deadlines: Vec::new() }
    }

    pub fn model(&self) -> &DiseaseModel {
        &self.model
    }

    /// Tick at which `agent` leaves its current duration-ruled state.
    pub fn deadline(&self, agent: AgentId) -> Option<Tick> {
        self.deadlines.get(agent.index()).copied().flatten()
    }

    fn arm_deadline(&mut self, agent: AgentId, entered: Tick, ctx: &mut ModuleContext<'_>) {
        let state = ctx.world.health_of(agent);
        let deadline = match self.model.progression(state).map(|p| &p.rule) {
            Some(Rule::After(d)) => Some(entered + d.sample_ticks(ctx.clock, ctx.rng)),
            _ => None,
        };
        self.deadlines[agent.index()] = deadline;
    }

    /// Move `count` randomly chosen live susceptible agents along the
    /// exposure edge.
    fn expose_random(&self, count: u32, ctx: &mut ModuleContext<'_>) -> usize {
        if count == 0 {
            return 0;
        }
        let world = ctx.world;
        let pool: Vec<AgentId> = world
            .agents
            .agent_ids()
            .filter(|&a| !world.is_dead(a) && self.model.is_susceptible(world.health_of(a)))
            .collect();
        let picked = ctx.rng.sample_indices(pool.len(), count as usize);
        for &i in &picked {
            ctx.emit(Request::Health { agent: pool[i], to: self.model.exposure_target });
        }
        picked.len()
    }

    fn on_start(&mut self, ctx: &mut ModuleContext<'_>) {
        let world = ctx.world;
        self.deadlines = vec![None; world.agent_count()];
        for agent in world.agents.agent_ids() {
            let entered = world.agents.health_since[agent.index()];
            self.arm_deadline(agent, entered, ctx);
        }
        let seeded = self.expose_random(self.model.initial_infections, ctx);
        info!(seeded, "initial infections");
    }

    fn on_tick(&mut self, ctx: &mut ModuleContext<'_>) {
        let exposed = self.transmit(ctx);
        let progressed = self.progress(ctx);
        debug!(tick = ctx.tick().0, exposed, progressed, "disease step");
    }

    /// Exposure: one draw per susceptible agent sharing a location with at
    /// least one infectious agent.
    fn transmit(&self, ctx: &mut ModuleContext<'_>) -> usize {
        let world: &WorldState = ctx.world;
        let mut exposed = 0;
        for loc in world.locations.location_ids() {
            let occupants = world.locations.occupants(loc);
            if occupants.len() < 2 {
                continue;
            }
            let rate = self.model.rate(world.locations.kind[loc.index()]);
            if rate == 0.0 {
                continue;
            }
            let p = exposure_probability(
                rate,
                occupants
                    .iter()
                    .map(|&a| self.model.infectiousness(world.health_of(a)))
                    .filter(|&i| i > 0.0),
            );
            if p <= 0.0 {
                continue;
            }
            for &agent in occupants {
                if self.model.is_susceptible(world.health_of(agent)) && ctx.rng.gen_bool(p) {
                    ctx.emit(Request::Health { agent, to: self.model.exposure_target });
                    exposed += 1;
                }
            }
        }
        exposed
    }

    /// Progression: every live, non-susceptible, non-terminal agent whose
    /// state rule fires this tick.
    fn progress(&self, ctx: &mut ModuleContext<'_>) -> usize {
        let world: &WorldState = ctx.world;
        let now = ctx.tick();
        let mut progressed = 0;
        for agent in world.agents.agent_ids() {
            let state = world.health_of(agent);
            if self.model.is_susceptible(state) || self.model.terminal[state.index()] {
                continue;
            }
            let Some(prog) = self.model.progression(state) else { continue };
            let fire = match prog.rule {
                Rule::After(_) => self.deadline(agent).is_some_and(|d| d <= now),
                Rule::Hazard(h) => ctx.rng.gen_bool(h),
            };
            if fire {
                let to = prog.pick_outcome(ctx.rng);
                ctx.emit(Request::Health { agent, to });
                progressed += 1;
            }
        }
        progressed
    }
}

impl Module for DiseaseModule {
    fn name(&self) -> &str {
        "disease"
    }

    fn kind(&self) -> ModuleKind {
        ModuleKind::Disease
    }

    fn subscriptions(&self) -> Vec<&'static str> {
        vec![
            "notify.time.start_simulation",
            "notify.time.tick",
            "notify.time.midnight",
            "notify.agent.health",
        ]
    }

    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        match *msg {
            Notification::StartSimulation => self.on_start(ctx),
            Notification::Tick { .. } => self.on_tick(ctx),
            Notification::Midnight { day, .. } => {
                let exposed = self.expose_random(self.model.random_exposures, ctx);
                if exposed > 0 {
                    debug!(day, exposed, "random exposures");
                }
            }
            Notification::Health { agent, .. } => {
                if self.deadlines.len() <= agent.index() {
                    self.deadlines.resize(agent.index() + 1, None);
                }
                let entered = ctx.world.agents.health_since[agent.index()];
                self.arm_deadline(agent, entered, ctx);
            }
            _ => {}
        }
        Ok(())
    }
}
