//! The `Module` trait, the extension point for behavior, disease and
//! intervention code, plus the registry that holds modules by kind.

use std::fmt;

use ep_core::{SimClock, SimRng, Tick};
use ep_world::WorldState;

use crate::{Envelope, ModuleResult, Notification, Request, RequestQueue};

// ── ModuleKind / ModuleId ─────────────────────────────────────────────────────

/// Source class of a module, used for conflict precedence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    Behavior,
    Disease,
    Intervention,
}

impl ModuleKind {
    pub fn label(self) -> &'static str {
        match self {
            ModuleKind::Behavior => "behavior",
            ModuleKind::Disease => "disease",
            ModuleKind::Intervention => "intervention",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registration index of a module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u16);

impl ModuleId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

// ── ModuleContext ─────────────────────────────────────────────────────────────

/// Everything a handler may touch while reacting to one notification.
///
/// The world view is read-only and stable for the whole tick.  The RNG is
/// the run's single source, lent exclusively for the duration of the call.
pub struct ModuleContext<'a> {
    pub clock: &'a SimClock,
    pub world: &'a WorldState,
    pub rng:   &'a mut SimRng,
    source:    ModuleId,
    kind:      ModuleKind,
    enabled:   bool,
    requests:  &'a mut RequestQueue,
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        clock:    &'a SimClock,
        world:    &'a WorldState,
        rng:      &'a mut SimRng,
        source:   ModuleId,
        kind:     ModuleKind,
        enabled:  bool,
        requests: &'a mut RequestQueue,
    ) -> Self {
        Self { clock, world, rng, source, kind, enabled, requests }
    }

    /// Current simulation tick.
    #[inline]
    pub fn tick(&self) -> Tick {
        self.clock.current_tick()
    }

    /// `false` while the intervention schedule has this module switched off.
    /// A disabled module should start no new work; work already under way
    /// runs to completion.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queue a request for the next resolve phase.
    pub fn emit(&mut self, request: Request) {
        self.requests.push(self.source, self.kind, request);
    }
}

// ── Module ────────────────────────────────────────────────────────────────────

/// A pluggable simulation component.
///
/// Modules see the world only through [`ModuleContext`], communicate only by
/// emitting requests, and never hold references to one another.  Per-module
/// bookkeeping (timers, booked tests, …) lives in the module itself.
///
/// # Example
///
/// ```rust,ignore
/// struct Census;
///
/// impl Module for Census {
///     fn name(&self) -> &str { "census" }
///     fn kind(&self) -> ModuleKind { ModuleKind::Intervention }
///     fn subscriptions(&self) -> Vec<&'static str> { vec!["notify.time.midnight"] }
///     fn handle(&mut self, _msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
///         tracing::info!(tick = ctx.tick().0, "midnight");
///         Ok(())
///     }
/// }
/// ```
pub trait Module {
    /// Unique name within a run.
    fn name(&self) -> &str;

    fn kind(&self) -> ModuleKind;

    /// Topic patterns (`exact.topic` or `prefix.*`) this module listens to.
    fn subscriptions(&self) -> Vec<&'static str>;

    /// React to one notification.  Any error aborts the tick.
    fn handle(&mut self, msg: &Notification, ctx: &mut ModuleContext<'_>) -> ModuleResult<()>;

    /// Check the module's configuration against the world before the run
    /// starts.  An error here is fatal at build time.
    fn validate(&self, _world: &WorldState) -> ModuleResult<()> {
        Ok(())
    }

    /// Look at the requests queued during the collect phase, before they
    /// are resolved, and emit more.  Every module sees the same snapshot,
    /// so requests emitted here are invisible to other reviewers.
    fn review(&mut self, _queued: &[Envelope], _ctx: &mut ModuleContext<'_>) -> ModuleResult<()> {
        Ok(())
    }
}

// ── ModuleRegistry ────────────────────────────────────────────────────────────

pub struct ModuleEntry {
    pub id:      ModuleId,
    pub kind:    ModuleKind,
    pub enabled: bool,
    pub module:  Box<dyn Module>,
}

/// Modules in registration order, tagged by kind.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, module: Box<dyn Module>) -> ModuleId {
        let id = ModuleId(self.entries.len() as u16);
        let kind = module.kind();
        self.entries.push(ModuleEntry { id, kind, enabled: true, module });
        id
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<ModuleId> {
        self.entries.iter().find(|e| e.module.name() == name).map(|e| e.id)
    }

    pub fn entry(&self, id: ModuleId) -> Option<&ModuleEntry> {
        self.entries.get(id.index())
    }

    pub fn entry_mut(&mut self, id: ModuleId) -> Option<&mut ModuleEntry> {
        self.entries.get_mut(id.index())
    }

    pub fn name(&self, id: ModuleId) -> &str {
        self.entry(id).map(|e| e.module.name()).unwrap_or("?")
    }

    /// Switch a module on or off.  Returns `false` for an unknown id.
    pub fn set_enabled(&mut self, id: ModuleId, enabled: bool) -> bool {
        match self.entry_mut(id) {
            Some(e) => {
                e.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, id: ModuleId) -> bool {
        self.entry(id).is_some_and(|e| e.enabled)
    }

    /// Modules of one kind, in registration order.
    pub fn of_kind(&self, kind: ModuleKind) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ModuleEntry> {
        self.entries.iter_mut()
    }
}
