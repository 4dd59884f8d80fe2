//! Typed message payloads.
//!
//! The two categories are separate types: modules produce [`Request`]s and
//! consume [`Notification`]s, and the engine does the reverse.  A module has
//! no way to construct a notification on the bus.

use ep_core::{ActivityId, AgentId, HealthId, LocationId, Tick};

use crate::{ModuleId, ModuleKind, Topic};

// ── Notification ──────────────────────────────────────────────────────────────

/// Something that has happened: a time signal or a committed change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    StartSimulation,
    Tick { tick: Tick },
    /// `day` counts calendar days since the start of the run.
    Midnight { tick: Tick, day: u64 },
    EndSimulation { final_tick: Tick },

    Health { agent: AgentId, from: HealthId, to: HealthId },
    Activity { agent: AgentId, from: ActivityId, to: ActivityId },
    Location { agent: AgentId, from: LocationId, to: LocationId },

    TestBooked { agent: AgentId },
    TestResult { agent: AgentId, positive: bool },
    QuarantineStarted { agent: AgentId },
    QuarantineStopped { agent: AgentId },
}

impl Notification {
    pub fn topic(&self) -> Topic {
        match self {
            Notification::StartSimulation => Topic::StartSimulation,
            Notification::Tick { .. } => Topic::Tick,
            Notification::Midnight { .. } => Topic::Midnight,
            Notification::EndSimulation { .. } => Topic::EndSimulation,
            Notification::Health { .. } => Topic::AgentHealth,
            Notification::Activity { .. } => Topic::AgentActivity,
            Notification::Location { .. } => Topic::AgentLocation,
            Notification::TestBooked { .. } => Topic::TestBooked,
            Notification::TestResult { .. } => Topic::TestResult,
            Notification::QuarantineStarted { .. } => Topic::QuarantineStarted,
            Notification::QuarantineStopped { .. } => Topic::QuarantineStopped,
        }
    }

    /// The agent a change notification concerns; `None` for time signals.
    pub fn agent(&self) -> Option<AgentId> {
        match *self {
            Notification::Health { agent, .. }
            | Notification::Activity { agent, .. }
            | Notification::Location { agent, .. }
            | Notification::TestBooked { agent }
            | Notification::TestResult { agent, .. }
            | Notification::QuarantineStarted { agent }
            | Notification::QuarantineStopped { agent } => Some(agent),
            _ => None,
        }
    }
}

// ── Request ───────────────────────────────────────────────────────────────────

/// A requested change to one agent, resolved and committed by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Request {
    Health { agent: AgentId, to: HealthId },
    Activity { agent: AgentId, to: ActivityId },
    Location { agent: AgentId, to: LocationId },
    BookTest { agent: AgentId },
    TestResult { agent: AgentId, positive: bool },
    StartQuarantine { agent: AgentId },
    StopQuarantine { agent: AgentId },
}

impl Request {
    pub fn topic(&self) -> Topic {
        match self {
            Request::Health { .. } => Topic::RequestHealth,
            Request::Activity { .. } => Topic::RequestActivity,
            Request::Location { .. } => Topic::RequestLocation,
            Request::BookTest { .. } => Topic::RequestBookTest,
            Request::TestResult { .. } => Topic::RequestTestResult,
            Request::StartQuarantine { .. } => Topic::RequestQuarantineStart,
            Request::StopQuarantine { .. } => Topic::RequestQuarantineStop,
        }
    }

    pub fn agent(&self) -> AgentId {
        match *self {
            Request::Health { agent, .. }
            | Request::Activity { agent, .. }
            | Request::Location { agent, .. }
            | Request::BookTest { agent }
            | Request::TestResult { agent, .. }
            | Request::StartQuarantine { agent }
            | Request::StopQuarantine { agent } => agent,
        }
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// A request stamped with where it came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    /// Publish order across the whole run.
    pub seq:     u64,
    pub source:  ModuleId,
    pub kind:    ModuleKind,
    pub request: Request,
}
