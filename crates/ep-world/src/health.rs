//! The configured health state graph.
//!
//! States and legal edges are configuration (the disease module builds them
//! from its parameters); the store only enforces them.  A state flagged
//! `terminal` has no outgoing edges, and `dead` implies `terminal`.

use ep_core::{HealthId, Labels};

use crate::{WorldError, WorldResult};

// ── HealthState ───────────────────────────────────────────────────────────────

/// One node of the health graph.
#[derive(Clone, Debug, PartialEq)]
pub struct HealthState {
    pub name: String,

    /// Eligible for exposure.
    pub susceptible: bool,

    /// Relative infectiousness while in this state; `0.0` means not
    /// infectious.
    pub infectiousness: f64,

    /// Never left once entered.
    pub terminal: bool,

    /// Removes the agent from the occupancy index.  Implies `terminal`.
    pub dead: bool,
}

impl HealthState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name:           name.into(),
            susceptible:    false,
            infectiousness: 0.0,
            terminal:       false,
            dead:           false,
        }
    }

    pub fn susceptible(mut self) -> Self {
        self.susceptible = true;
        self
    }

    pub fn infectious(mut self, infectiousness: f64) -> Self {
        self.infectiousness = infectiousness;
        self
    }

    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    pub fn dead(mut self) -> Self {
        self.dead = true;
        self.terminal = true;
        self
    }

    #[inline]
    pub fn is_infectious(&self) -> bool {
        self.infectiousness > 0.0
    }
}

// ── HealthModel ───────────────────────────────────────────────────────────────

/// Health states plus the legal transitions between them.
///
/// State 0 is the default initial state for agents that do not specify one.
#[derive(Clone, Debug)]
pub struct HealthModel {
    labels:     Labels,
    states:     Vec<HealthState>,
    /// Sorted successor list per state.
    successors: Vec<Vec<HealthId>>,
}

impl HealthModel {
    /// Validate `states` and `edges` (pairs of state names) into a model.
    ///
    /// # Errors
    ///
    /// [`WorldError::Config`] for an empty state list, a negative or
    /// non-finite infectiousness, an edge leaving a terminal state, or a
    /// self-loop; [`WorldError::Core`] for duplicate or unknown names.
    pub fn new<S: AsRef<str>>(states: Vec<HealthState>, edges: &[(S, S)]) -> WorldResult<Self> {
        if states.is_empty() {
            return Err(WorldError::Config("health model has no states".into()));
        }
        let labels = Labels::new("health state", states.iter().map(|s| s.name.clone()))?;

        for s in &states {
            if !s.infectiousness.is_finite() || s.infectiousness < 0.0 {
                return Err(WorldError::Config(format!(
                    "health state {:?} has invalid infectiousness {}",
                    s.name, s.infectiousness
                )));
            }
            if s.dead && !s.terminal {
                return Err(WorldError::Config(format!("dead state {:?} must be terminal", s.name)));
            }
        }

        let mut successors = vec![Vec::new(); states.len()];
        for (from, to) in edges {
            let f = labels.require(from.as_ref())?;
            let t = labels.require(to.as_ref())?;
            if f == t {
                return Err(WorldError::Config(format!("self-loop on health state {:?}", from.as_ref())));
            }
            if states[f as usize].terminal {
                return Err(WorldError::Config(format!(
                    "terminal health state {:?} has an outgoing edge",
                    from.as_ref()
                )));
            }
            successors[f as usize].push(HealthId(t));
        }
        for list in &mut successors {
            list.sort_unstable();
            list.dedup();
        }

        Ok(Self { labels, states, successors })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All state ids in index order.
    pub fn ids(&self) -> impl Iterator<Item = HealthId> + '_ {
        (0..self.states.len() as u16).map(HealthId)
    }

    /// Default state for agents whose initial health is not given.
    pub fn initial_state(&self) -> HealthId {
        HealthId(0)
    }

    pub fn id(&self, name: &str) -> Option<HealthId> {
        self.labels.position(name).map(HealthId)
    }

    pub fn require(&self, name: &str) -> WorldResult<HealthId> {
        Ok(HealthId(self.labels.require(name)?))
    }

    /// State at `id`.  Panics on an id not produced by this model.
    #[inline]
    pub fn state(&self, id: HealthId) -> &HealthState {
        &self.states[id.index()]
    }

    pub fn get(&self, id: HealthId) -> Option<&HealthState> {
        self.states.get(id.index())
    }

    pub fn name(&self, id: HealthId) -> &str {
        self.labels.name(id.index())
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn successors(&self, from: HealthId) -> &[HealthId] {
        self.successors.get(from.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn is_legal(&self, from: HealthId, to: HealthId) -> bool {
        self.successors(from).binary_search(&to).is_ok()
    }

    #[inline]
    pub fn is_terminal(&self, id: HealthId) -> bool {
        self.get(id).is_some_and(|s| s.terminal)
    }

    #[inline]
    pub fn is_dead(&self, id: HealthId) -> bool {
        self.get(id).is_some_and(|s| s.dead)
    }
}
