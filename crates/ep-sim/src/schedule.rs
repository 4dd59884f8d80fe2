//! `InterventionSchedule` — switches intervention modules on and off at
//! given ticks.

use ep_bus::{ModuleId, ModuleKind, ModuleRegistry};
use ep_core::{DeferredQueue, Tick};

use crate::{SimError, SimResult};

#[derive(Clone, Debug, Default)]
pub struct InterventionSchedule {
    initially_disabled: Vec<String>,
    events:             Vec<(Tick, String, bool)>,
}

impl InterventionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as disabled from the start of the run.
    pub fn start_disabled(mut self, name: impl Into<String>) -> Self {
        self.initially_disabled.push(name.into());
        self
    }

    pub fn enable_at(mut self, tick: Tick, name: impl Into<String>) -> Self {
        self.events.push((tick, name.into(), true));
        self
    }

    pub fn disable_at(mut self, tick: Tick, name: impl Into<String>) -> Self {
        self.events.push((tick, name.into(), false));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.initially_disabled.is_empty() && self.events.is_empty()
    }

    /// Resolve module names and apply the initial state to `registry`.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] for an unknown module or a module that is not an
    /// intervention.
    pub(crate) fn compile(self, registry: &mut ModuleRegistry) -> SimResult<DeferredQueue<(ModuleId, bool)>> {
        for name in &self.initially_disabled {
            let id = intervention(registry, name)?;
            registry.set_enabled(id, false);
        }
        let mut queue = DeferredQueue::new();
        for (tick, name, enabled) in self.events {
            queue.push(tick, (intervention(registry, &name)?, enabled));
        }
        Ok(queue)
    }
}

fn intervention(registry: &ModuleRegistry, name: &str) -> SimResult<ModuleId> {
    let id = registry
        .find(name)
        .ok_or_else(|| SimError::Config(format!("schedule names unknown module {name:?}")))?;
    match registry.entry(id).map(|e| e.kind) {
        Some(ModuleKind::Intervention) => Ok(id),
        _ => Err(SimError::Config(format!("schedule names {name:?}, which is not an intervention"))),
    }
}
