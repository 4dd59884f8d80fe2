//! Simulation observer trait for progress reporting and data collection.

use ep_core::Tick;
use ep_world::WorldState;

use crate::{ChangeRecord, TickSummary};

/// Callbacks invoked by [`Sim`][crate::Sim] at key points of a run.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Every callback sees the world after
/// the commit it reports on.
pub trait SimObserver {
    /// Called once after `notify.time.start_simulation` has been delivered.
    fn on_start(&mut self, _world: &WorldState) {}

    /// Called at the very start of each tick, before any notification.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every committed change, in commit order.
    fn on_change(&mut self, _record: &ChangeRecord, _world: &WorldState) {}

    /// Called once the tick's notifications have been delivered.
    fn on_tick_end(&mut self, _summary: &TickSummary, _world: &WorldState) {}

    /// Called once after `notify.time.end_simulation` has been delivered.
    fn on_end(&mut self, _final_tick: Tick, _world: &WorldState) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every change record and tick summary in memory.
#[derive(Debug, Default)]
pub struct ChangeLog {
    pub records:   Vec<ChangeRecord>,
    pub summaries: Vec<TickSummary>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimObserver for ChangeLog {
    fn on_change(&mut self, record: &ChangeRecord, _world: &WorldState) {
        self.records.push(*record);
    }

    fn on_tick_end(&mut self, summary: &TickSummary, _world: &WorldState) {
        self.summaries.push(*summary);
    }
}

/// Forwards every callback to two observers in turn.
pub struct Tee<'a, A: SimObserver, B: SimObserver>(pub &'a mut A, pub &'a mut B);

impl<A: SimObserver, B: SimObserver> SimObserver for Tee<'_, A, B> {
    fn on_start(&mut self, world: &WorldState) {
        self.0.on_start(world);
        self.1.on_start(world);
    }

    fn on_tick_start(&mut self, tick: Tick) {
        self.0.on_tick_start(tick);
        self.1.on_tick_start(tick);
    }

    fn on_change(&mut self, record: &ChangeRecord, world: &WorldState) {
        self.0.on_change(record, world);
        self.1.on_change(record, world);
    }

    fn on_tick_end(&mut self, summary: &TickSummary, world: &WorldState) {
        self.0.on_tick_end(summary, world);
        self.1.on_tick_end(summary, world);
    }

    fn on_end(&mut self, final_tick: Tick, world: &WorldState) {
        self.0.on_end(final_tick, world);
        self.1.on_end(final_tick, world);
    }
}
