//! Fluent builder for constructing a [`Sim`].

use ep_bus::{MessageBus, Module, ModuleRegistry};
use ep_core::{SimConfig, SimRng};
use ep_world::WorldState;

use crate::{InterventionSchedule, Precedence, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: start time, tick duration, total ticks, seed, …
/// - [`WorldState`]: from [`ep_world::WorldBuilder`] or the CSV loader
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                       |
/// |-------------------|-----------------------------------------------|
/// | `.module(m)`      | none; a run without modules only keeps time   |
/// | `.precedence(p)`  | disease > intervention > behavior, every field |
/// | `.schedule(s)`    | every intervention enabled throughout         |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, world)
///     .module(MarkovBehavior::new(matrices, MarkovConfig::default()))
///     .module(DiseaseModule::new(disease))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    world:      WorldState,
    modules:    Vec<Box<dyn Module>>,
    precedence: Precedence,
    schedule:   InterventionSchedule,
}

impl SimBuilder {
    pub fn new(config: SimConfig, world: WorldState) -> Self {
        Self {
            config,
            world,
            modules:    Vec::new(),
            precedence: Precedence::default(),
            schedule:   InterventionSchedule::new(),
        }
    }

    /// Add a module.  Registration order is delivery order within a topic.
    pub fn module<M: Module + 'static>(self, module: M) -> Self {
        self.boxed_module(Box::new(module))
    }

    pub fn boxed_module(mut self, module: Box<dyn Module>) -> Self {
        self.modules.push(module);
        self
    }

    pub fn precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn schedule(mut self, schedule: InterventionSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Validate inputs, register modules, and return a ready-to-run [`Sim`].
    ///
    /// # Errors
    ///
    /// Invalid clock parameters, a duplicate module name or subscription
    /// pattern, an inconsistent precedence table, a schedule naming an
    /// unknown module, a world whose occupancy index disagrees with its
    /// agents, or a module whose configuration does not fit the world.
    pub fn build(self) -> SimResult<Sim> {
        let clock = self.config.make_clock()?;
        self.precedence.validate()?;
        if !self.world.occupancy_consistent() {
            return Err(SimError::Config("world occupancy index is inconsistent".into()));
        }

        for module in &self.modules {
            module
                .validate(&self.world)
                .map_err(|e| SimError::Config(format!("module {:?}: {e}", module.name())))?;
        }

        let mut registry = ModuleRegistry::new();
        let mut bus = MessageBus::new();
        for module in self.modules {
            bus.register(&mut registry, module)?;
        }
        let schedule = self.schedule.compile(&mut registry)?;
        let rng = SimRng::new(self.config.seed);

        Ok(Sim::from_parts(self.config, clock, self.world, registry, bus, rng, self.precedence, schedule))
    }
}
