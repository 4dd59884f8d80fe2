//! Serde-deserializable disease parameters.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "states": [
//!     { "name": "susceptible", "susceptible": true },
//!     { "name": "exposed" },
//!     { "name": "infectious", "infectiousness": 1.0 },
//!     { "name": "recovered", "terminal": true },
//!     { "name": "dead", "dead": true }
//!   ],
//!   "exposure_target": "exposed",
//!   "progressions": [
//!     { "from": "exposed", "rule": { "after": { "gamma": { "shape": 4.0, "scale": 1.0 } } },
//!       "outcomes": [ { "to": "infectious", "weight": 1.0 } ] },
//!     { "from": "infectious", "rule": { "after": { "uniform": { "min_days": 5, "max_days": 10 } } },
//!       "outcomes": [ { "to": "recovered", "weight": 0.99 }, { "to": "dead", "weight": 0.01 } ] }
//!   ],
//!   "transmission": { "default_rate": 0.0, "by_location_type": { "house": 0.05 } },
//!   "initial_infections": 5,
//!   "random_exposures_per_day": 0
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use ep_world::{HealthModel, HealthState};

use crate::{DiseaseError, DiseaseResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateParams {
    pub name: String,
    #[serde(default)]
    pub susceptible: bool,
    #[serde(default)]
    pub infectiousness: f64,
    #[serde(default)]
    pub terminal: bool,
    #[serde(default)]
    pub dead: bool,
}

/// Time spent in a state, in days.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationDist {
    Constant { days: f64 },
    /// Whole days drawn uniformly from `min_days..max_days` (upper bound
    /// exclusive).
    Uniform { min_days: u32, max_days: u32 },
    Gamma { shape: f64, scale: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionRule {
    /// Leave the state once a duration sampled on entry has elapsed.
    After(DurationDist),
    /// Leave the state with this probability each tick.
    Hazard(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub to:     String,
    pub weight: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionParams {
    pub from:     String,
    pub rule:     ProgressionRule,
    pub outcomes: Vec<Outcome>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmissionParams {
    /// Per-tick transmission rate for location types not listed below.
    #[serde(default)]
    pub default_rate: f64,
    #[serde(default)]
    pub by_location_type: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiseaseParams {
    pub states: Vec<StateParams>,
    pub exposure_target: String,
    #[serde(default)]
    pub progressions: Vec<ProgressionParams>,
    #[serde(default)]
    pub transmission: TransmissionParams,
    /// Susceptible agents moved along the exposure edge at the start of the
    /// run.
    #[serde(default)]
    pub initial_infections: u32,
    /// Susceptible agents exposed at random each midnight.
    #[serde(default)]
    pub random_exposures_per_day: u32,
}

impl DiseaseParams {
    pub fn from_json_str(s: &str) -> DiseaseResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> DiseaseResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    /// The legal health graph implied by these parameters: every
    /// susceptible state leads to the exposure target, and every progression
    /// leads to each of its outcomes.
    pub fn health_model(&self) -> DiseaseResult<HealthModel> {
        let states = self
            .states
            .iter()
            .map(|s| {
                let mut h = HealthState::new(s.name.clone()).infectious(s.infectiousness);
                h.susceptible = s.susceptible;
                h.terminal = s.terminal || s.dead;
                h.dead = s.dead;
                h
            })
            .collect::<Vec<_>>();

        if let Some(s) = states.iter().find(|s| s.susceptible && s.is_infectious()) {
            return Err(DiseaseError::Config(format!(
                "susceptible state {:?} cannot be infectious",
                s.name
            )));
        }

        let mut edges: Vec<(&str, &str)> = Vec::new();
        for s in self.states.iter().filter(|s| s.susceptible) {
            edges.push((s.name.as_str(), self.exposure_target.as_str()));
        }
        for p in &self.progressions {
            for o in &p.outcomes {
                edges.push((p.from.as_str(), o.to.as_str()));
            }
        }
        Ok(HealthModel::new(states, &edges)?)
    }
}
