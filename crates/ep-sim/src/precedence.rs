//! Request precedence and per-tick conflict resolution.
//!
//! Each request writes exactly one [`Field`] of one agent.  For every
//! `(agent, field)` pair touched in a tick the request from the highest
//! ranked module kind wins.  Several requests at the winning rank are
//! merged when they ask for the same value (the earliest published is
//! kept) and are a fatal conflict otherwise.  Requests below the winning
//! rank are overridden silently, whatever they ask for.

use std::collections::BTreeMap;
use std::fmt;

use tracing::trace;

use ep_bus::{Envelope, ModuleKind, ModuleRegistry, Request};
use ep_core::{AgentId, Tick};
use ep_world::WorldState;

use crate::{SimError, SimResult};

// ── Field ─────────────────────────────────────────────────────────────────────

/// The agent state field a request writes.  Declaration order is commit
/// order within one agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Health,
    Quarantine,
    TestBooking,
    TestResult,
    Activity,
    Location,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Health,
        Field::Quarantine,
        Field::TestBooking,
        Field::TestResult,
        Field::Activity,
        Field::Location,
    ];

    pub fn of(request: &Request) -> Field {
        match request {
            Request::Health { .. } => Field::Health,
            Request::StartQuarantine { .. } | Request::StopQuarantine { .. } => Field::Quarantine,
            Request::BookTest { .. } => Field::TestBooking,
            Request::TestResult { .. } => Field::TestResult,
            Request::Activity { .. } => Field::Activity,
            Request::Location { .. } => Field::Location,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Health => "health",
            Field::Quarantine => "quarantine",
            Field::TestBooking => "test booking",
            Field::TestResult => "test result",
            Field::Activity => "activity",
            Field::Location => "location",
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Precedence ────────────────────────────────────────────────────────────────

/// Rank of each module kind, per field.  Higher wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Precedence {
    ranks: [[u8; 3]; 6],
}

impl Default for Precedence {
    /// Disease over intervention over behavior, on every field.
    fn default() -> Self {
        Self::uniform([ModuleKind::Disease, ModuleKind::Intervention, ModuleKind::Behavior])
    }
}

impl Precedence {
    /// The same order, highest first, on every field.
    pub fn uniform(order: [ModuleKind; 3]) -> Self {
        let mut p = Self { ranks: [[0; 3]; 6] };
        for field in Field::ALL {
            p.set_order(field, order);
        }
        p
    }

    /// Override the order, highest first, for one field.
    pub fn with_order(mut self, field: Field, order: [ModuleKind; 3]) -> Self {
        self.set_order(field, order);
        self
    }

    pub fn set_order(&mut self, field: Field, order: [ModuleKind; 3]) {
        for (i, kind) in order.into_iter().enumerate() {
            self.ranks[field.index()][kind_index(kind)] = (3 - i) as u8;
        }
    }

    #[inline]
    pub fn rank(&self, field: Field, kind: ModuleKind) -> u8 {
        self.ranks[field.index()][kind_index(kind)]
    }

    /// Every kind must appear exactly once in each field's order.
    pub(crate) fn validate(&self) -> SimResult<()> {
        for field in Field::ALL {
            let mut ranks = self.ranks[field.index()];
            ranks.sort_unstable();
            if ranks != [1, 2, 3] {
                return Err(SimError::Config(format!(
                    "precedence for {field} must rank each module kind exactly once"
                )));
            }
        }
        Ok(())
    }
}

fn kind_index(kind: ModuleKind) -> usize {
    match kind {
        ModuleKind::Behavior => 0,
        ModuleKind::Disease => 1,
        ModuleKind::Intervention => 2,
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// The winning request per `(agent, field)`, iterated in commit order.
#[derive(Debug, Default)]
pub struct Resolution {
    pub winners:    BTreeMap<(AgentId, Field), Envelope>,
    /// Requests beaten by a higher rank.
    pub overridden: usize,
    /// Duplicates of a winning request folded into it.
    pub merged:     usize,
}

impl Resolution {
    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }
}

/// Resolve one tick's requests against the world as it stood at tick start.
///
/// # Errors
///
/// - [`SimError::UnknownAgent`] / [`SimError::DeadAgent`] for a request
///   naming an agent that does not exist or is already dead.
/// - [`SimError::Conflict`] for two different values at the winning rank.
pub fn resolve(
    tick:       Tick,
    requests:   Vec<Envelope>,
    precedence: &Precedence,
    world:      &WorldState,
    registry:   &ModuleRegistry,
) -> SimResult<Resolution> {
    let mut grouped: BTreeMap<(AgentId, Field), Vec<Envelope>> = BTreeMap::new();
    for env in requests {
        let agent = env.request.agent();
        if !world.agents.contains(agent) {
            return Err(SimError::UnknownAgent {
                tick,
                agent,
                module: registry.name(env.source).to_owned(),
                request: env.request.topic().to_string(),
            });
        }
        if world.is_dead(agent) {
            return Err(SimError::DeadAgent {
                tick,
                agent,
                module: registry.name(env.source).to_owned(),
                request: env.request.topic().to_string(),
            });
        }
        grouped.entry((agent, Field::of(&env.request))).or_default().push(env);
    }

    let mut out = Resolution::default();
    for ((agent, field), mut envs) in grouped {
        envs.sort_by_key(|e| e.seq);
        let top = envs.iter().map(|e| precedence.rank(field, e.kind)).max().unwrap_or(0);
        let mut winner: Option<Envelope> = None;
        for env in envs {
            if precedence.rank(field, env.kind) < top {
                trace!(tick = tick.0, agent = %agent, %field, module = registry.name(env.source), "overridden");
                out.overridden += 1;
                continue;
            }
            match winner {
                None => winner = Some(env),
                Some(w) if w.request == env.request => out.merged += 1,
                Some(w) => {
                    return Err(SimError::Conflict {
                        tick,
                        agent,
                        field,
                        first: describe(&w, registry),
                        second: describe(&env, registry),
                    });
                }
            }
        }
        if let Some(w) = winner {
            out.winners.insert((agent, field), w);
        }
    }
    Ok(out)
}

fn describe(env: &Envelope, registry: &ModuleRegistry) -> String {
    format!("{:?} from {:?} (#{})", env.request, registry.name(env.source), env.seq)
}
