//! The `Sim` struct and its tick loop.

use std::collections::BTreeMap;

use tracing::{debug, info};

use ep_bus::{MessageBus, ModuleId, ModuleRegistry, Notification, Request};
use ep_core::{AgentId, DeferredQueue, SimClock, SimConfig, SimRng, Tick};
use ep_world::{FieldValue, TestStatus, WorldState};

use crate::precedence::resolve;
use crate::{Change, ChangeRecord, Field, Precedence, Resolution, SimError, SimObserver, SimResult, TickSummary};

// ── Run state ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
}

/// Where within a tick the engine currently is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Between ticks.
    Idle,
    /// Tick-start signals delivered and queued requests reviewed.
    Collect,
    /// Requests grouped per agent and field; precedence applied.
    Resolve,
    /// Winning requests written to the world store.
    Commit,
    /// Change notifications delivered; replies wait for the next tick.
    Notify,
}

// ── Commit bookkeeping ────────────────────────────────────────────────────────

#[derive(Default)]
struct CommitLog {
    records: Vec<ChangeRecord>,
    notes:   Vec<Notification>,
    dropped: usize,
}

impl CommitLog {
    fn push(&mut self, tick: Tick, agent: AgentId, field: Field, change: Change, note: Notification) {
        self.records.push(ChangeRecord { tick, agent, field, change });
        self.notes.push(note);
    }
}

/// The winning request for each field of one agent, indexed by `Field`.
type Slots = [Option<Request>; 6];

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The simulation engine.
///
/// Owns the clock, the world store, the module registry, the bus and the
/// run's single RNG.  Each tick runs four phases in order:
///
/// 1. **Collect**: `notify.time.tick` (and `notify.time.midnight` on a day
///    boundary) are delivered; modules queue requests, then each module
///    reviews what was queued and may add overrides.
/// 2. **Resolve**: every request queued since the previous resolve is
///    grouped by `(agent, field)` and reduced by [`Precedence`].
/// 3. **Commit**: winners are written per agent in ascending id, fields in
///    [`Field`] order.  Equal-value writes are no-ops.
/// 4. **Notify**: one notification per committed change is delivered.
///    Requests emitted in reaction wait for the next tick's resolve.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    config:     SimConfig,
    clock:      SimClock,
    world:      WorldState,
    registry:   ModuleRegistry,
    bus:        MessageBus,
    rng:        SimRng,
    precedence: Precedence,
    schedule:   DeferredQueue<(ModuleId, bool)>,
    state:      RunState,
    phase:      Phase,
    ticks_run:  u64,
    /// Calendar day of tick 0, for midnight day counts.
    first_day:  i64,
}

impl Sim {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config:     SimConfig,
        clock:      SimClock,
        world:      WorldState,
        registry:   ModuleRegistry,
        bus:        MessageBus,
        rng:        SimRng,
        precedence: Precedence,
        schedule:   DeferredQueue<(ModuleId, bool)>,
    ) -> Self {
        let first_day = clock.day_index(Tick::ZERO);
        Self {
            config,
            clock,
            world,
            registry,
            bus,
            rng,
            precedence,
            schedule,
            state: RunState::NotStarted,
            phase: Phase::Idle,
            ticks_run: 0,
            first_day,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Read-only view of the world.  Only the engine's commit writes it.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn precedence(&self) -> &Precedence {
        &self.precedence
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ticks_run(&self) -> u64 {
        self.ticks_run
    }

    /// Requests queued for the next resolve phase.
    pub fn pending_requests(&self) -> usize {
        self.bus.requests().len()
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// `start`, every tick, then `finish`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.start(observer)?;
        while self.step(observer)? {}
        self.finish(observer)
    }

    /// Deliver `notify.time.start_simulation`.  Requests emitted in
    /// response are resolved in tick 0.
    pub fn start<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.expect(RunState::NotStarted)?;
        self.state = RunState::Running;
        info!(
            agents = self.world.agent_count(),
            locations = self.world.location_count(),
            modules = self.registry.len(),
            ticks = self.clock.total_ticks(),
            "simulation starting"
        );
        self.bus.publish(Notification::StartSimulation);
        self.deliver()?;
        observer.on_start(&self.world);
        Ok(())
    }

    /// Execute the next tick.  Returns `false`, without doing anything,
    /// once the clock is exhausted.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<bool> {
        self.expect(RunState::Running)?;
        let Some(tick) = self.clock.next() else {
            return Ok(false);
        };

        // ── Collect ───────────────────────────────────────────────────────
        self.phase = Phase::Collect;
        self.apply_schedule(tick);
        observer.on_tick_start(tick);
        self.bus.publish(Notification::Tick { tick });
        if self.clock.is_midnight() {
            let day = (self.clock.day_index(tick) - self.first_day).max(0) as u64;
            self.bus.publish(Notification::Midnight { tick, day });
        }
        self.deliver()?;
        self.bus.review_all(&mut self.registry, &self.clock, &self.world, &mut self.rng)?;

        // ── Resolve ───────────────────────────────────────────────────────
        self.phase = Phase::Resolve;
        let requests = self.bus.requests_mut().take();
        let request_count = requests.len();
        let resolution = resolve(tick, requests, &self.precedence, &self.world, &self.registry)?;

        // ── Commit ────────────────────────────────────────────────────────
        self.phase = Phase::Commit;
        let log = self.commit(tick, &resolution)?;

        // ── Notify ────────────────────────────────────────────────────────
        self.phase = Phase::Notify;
        let notifications = log.notes.len();
        for note in log.notes {
            self.bus.publish(note);
        }
        self.deliver()?;
        self.phase = Phase::Idle;

        for record in &log.records {
            observer.on_change(record, &self.world);
        }
        let summary = TickSummary {
            tick,
            requests: request_count,
            overridden: resolution.overridden,
            merged: resolution.merged,
            committed: log.records.len(),
            dropped: log.dropped,
            notifications,
        };
        debug!(
            tick = tick.0,
            requests = summary.requests,
            committed = summary.committed,
            overridden = summary.overridden,
            "tick done"
        );
        observer.on_tick_end(&summary, &self.world);
        self.ticks_run += 1;
        Ok(true)
    }

    /// Deliver `notify.time.end_simulation`.  Requests still queued, or
    /// emitted in response, are discarded.
    pub fn finish<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        self.expect(RunState::Running)?;
        let final_tick = Tick(self.ticks_run);
        self.bus.publish(Notification::EndSimulation { final_tick });
        self.deliver()?;
        let discarded = self.bus.requests_mut().take().len();
        if discarded > 0 {
            debug!(discarded, "requests left at end of run discarded");
        }
        self.state = RunState::Finished;
        observer.on_end(final_tick, &self.world);
        info!(ticks = self.ticks_run, "simulation finished");
        Ok(())
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn expect(&self, expected: RunState) -> SimResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SimError::State { expected, actual: self.state })
        }
    }

    fn deliver(&mut self) -> SimResult<usize> {
        Ok(self.bus.deliver_all(&mut self.registry, &self.clock, &self.world, &mut self.rng)?)
    }

    fn apply_schedule(&mut self, tick: Tick) {
        for (id, enabled) in self.schedule.drain_due(tick) {
            self.registry.set_enabled(id, enabled);
            info!(tick = tick.0, module = self.registry.name(id), enabled, "intervention schedule");
        }
    }

    fn apply(&mut self, tick: Tick, agent: AgentId, value: FieldValue) -> SimResult<()> {
        self.world
            .apply(tick, agent, value)
            .map(|_| ())
            .map_err(|source| SimError::Commit { tick, source })
    }

    fn commit(&mut self, tick: Tick, resolution: &Resolution) -> SimResult<CommitLog> {
        let mut per_agent: BTreeMap<AgentId, Slots> = BTreeMap::new();
        for (&(agent, field), env) in &resolution.winners {
            per_agent.entry(agent).or_insert([None; 6])[field.index()] = Some(env.request);
        }
        let mut log = CommitLog::default();
        for (agent, slots) in per_agent {
            self.commit_agent(tick, agent, &slots, &mut log)?;
        }
        Ok(log)
    }

    fn commit_agent(&mut self, tick: Tick, agent: AgentId, slots: &Slots, log: &mut CommitLog) -> SimResult<()> {
        // ── Health ────────────────────────────────────────────────────────
        if let Some(Request::Health { to, .. }) = slots[Field::Health.index()] {
            let from = self.world.health_of(agent);
            if from != to {
                self.apply(tick, agent, FieldValue::Health(to))?;
                let note = Notification::Health { agent, from, to };
                log.push(tick, agent, Field::Health, Change::Health { from, to }, note);
            }
        }

        // ── Quarantine ────────────────────────────────────────────────────
        if let Some(req) = slots[Field::Quarantine.index()] {
            let to = matches!(req, Request::StartQuarantine { .. });
            let from = self.world.is_quarantined(agent);
            if from != to {
                self.apply(tick, agent, FieldValue::Quarantine(to))?;
                let note = if to {
                    Notification::QuarantineStarted { agent }
                } else {
                    Notification::QuarantineStopped { agent }
                };
                log.push(tick, agent, Field::Quarantine, Change::Quarantine { from, to }, note);
            }
        }

        // ── Testing ───────────────────────────────────────────────────────
        if slots[Field::TestBooking.index()].is_some() {
            let from = self.world.testing_of(agent);
            if !from.is_booked() {
                let to = TestStatus::Booked { since: tick };
                self.apply(tick, agent, FieldValue::Testing(to))?;
                let note = Notification::TestBooked { agent };
                log.push(tick, agent, Field::TestBooking, Change::Testing { from, to }, note);
            }
        }
        if let Some(Request::TestResult { positive, .. }) = slots[Field::TestResult.index()] {
            let from = self.world.testing_of(agent);
            let to = if positive { TestStatus::Positive { at: tick } } else { TestStatus::Negative { at: tick } };
            if from != to {
                self.apply(tick, agent, FieldValue::Testing(to))?;
                let note = Notification::TestResult { agent, positive };
                log.push(tick, agent, Field::TestResult, Change::Testing { from, to }, note);
            }
        }

        // ── Movement ──────────────────────────────────────────────────────
        let activity = match slots[Field::Activity.index()] {
            Some(Request::Activity { to, .. }) => Some(to),
            _ => None,
        };
        let location = match slots[Field::Location.index()] {
            Some(Request::Location { to, .. }) => Some(to),
            _ => None,
        };
        if activity.is_none() && location.is_none() {
            return Ok(());
        }
        if self.world.is_dead(agent) {
            let dropped = activity.is_some() as usize + location.is_some() as usize;
            log.dropped += dropped;
            debug!(tick = tick.0, agent = %agent, dropped, "movement dropped for agent who died this tick");
            return Ok(());
        }

        let (act_from, loc_from) = (self.world.activity_of(agent), self.world.location_of(agent));
        let act_to = activity.unwrap_or(act_from);
        let loc_to = location.unwrap_or(loc_from);
        if act_to == act_from && loc_to == loc_from {
            return Ok(());
        }
        if !self.world.agents.is_permitted(agent, act_to, loc_to) {
            return Err(SimError::NotPermitted {
                tick,
                agent,
                activity: self.world.activities.name(act_to.index()).to_owned(),
                location: loc_to.to_string(),
            });
        }
        if act_to != act_from {
            self.apply(tick, agent, FieldValue::Activity(act_to))?;
            let note = Notification::Activity { agent, from: act_from, to: act_to };
            log.push(tick, agent, Field::Activity, Change::Activity { from: act_from, to: act_to }, note);
        }
        if loc_to != loc_from {
            self.apply(tick, agent, FieldValue::Location(loc_to))?;
            let note = Notification::Location { agent, from: loc_from, to: loc_to };
            log.push(tick, agent, Field::Location, Change::Location { from: loc_from, to: loc_to }, note);
        }
        Ok(())
    }
}
