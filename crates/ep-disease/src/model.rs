//! Disease parameters compiled against a concrete health graph and set of
//! location types.

use rand::distributions::{Distribution, WeightedIndex};
use rand_distr::Gamma;

use ep_core::{HealthId, Labels, LocationTypeId, SimClock, SimRng};
use ep_world::HealthModel;

use crate::params::{DiseaseParams, DurationDist, ProgressionRule};
use crate::{DiseaseError, DiseaseResult};

// ── Durations ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub(crate) enum Duration {
    Constant(f64),
    Uniform(u32, u32),
    Gamma(Gamma<f64>),
}

impl Duration {
    fn compile(dist: &DurationDist, state: &str) -> DiseaseResult<Self> {
        match *dist {
            DurationDist::Constant { days } if days.is_finite() && days >= 0.0 => Ok(Duration::Constant(days)),
            DurationDist::Uniform { min_days, max_days } if min_days < max_days => {
                Ok(Duration::Uniform(min_days, max_days))
            }
            DurationDist::Gamma { shape, scale } if shape > 0.0 && scale > 0.0 => Gamma::new(shape, scale)
                .map(Duration::Gamma)
                .map_err(|e| DiseaseError::Config(format!("state {state:?}: {e}"))),
            ref other => Err(DiseaseError::Config(format!(
                "state {state:?}: invalid duration {other:?}"
            ))),
        }
    }

    /// Sample a duration in days.
    fn sample_days(&self, rng: &mut SimRng) -> f64 {
        match self {
            Duration::Constant(d) => *d,
            Duration::Uniform(lo, hi) => rng.gen_range(*lo..*hi) as f64,
            Duration::Gamma(g) => g.sample(rng.inner()),
        }
    }

    /// Sample a duration in whole ticks; never less than one.
    pub(crate) fn sample_ticks(&self, clock: &SimClock, rng: &mut SimRng) -> u64 {
        clock.ticks_for_days_f64(self.sample_days(rng)).max(1)
    }
}

// ── Progressions ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub(crate) enum Rule {
    After(Duration),
    Hazard(f64),
}

#[derive(Clone, Debug)]
pub(crate) struct Progression {
    pub(crate) rule: Rule,
    targets:         Vec<HealthId>,
    choice:          WeightedIndex<f64>,
}

impl Progression {
    pub(crate) fn pick_outcome(&self, rng: &mut SimRng) -> HealthId {
        self.targets[self.choice.sample(rng.inner())]
    }
}

// ── DiseaseModel ──────────────────────────────────────────────────────────────

/// Validated, id-indexed disease configuration.
#[derive(Clone, Debug)]
pub struct DiseaseModel {
    pub(crate) exposure_target:    HealthId,
    /// Indexed by `HealthId`; `None` where the state has no exit rule.
    pub(crate) progressions:       Vec<Option<Progression>>,
    /// Indexed by `LocationTypeId`.
    pub(crate) rates:              Vec<f64>,
    /// Indexed by `HealthId`.
    pub(crate) infectiousness:     Vec<f64>,
    pub(crate) susceptible:        Vec<bool>,
    pub(crate) terminal:           Vec<bool>,
    pub(crate) initial_infections: u32,
    pub(crate) random_exposures:   u32,
}

impl DiseaseModel {
    /// Compile `params` against the health graph the world was built with
    /// and the run's location types.
    ///
    /// # Errors
    ///
    /// [`DiseaseError::Config`] for any parameter that is out of range,
    /// names an unknown state or location type, or contradicts the graph.
    pub fn compile(params: &DiseaseParams, health: &HealthModel, location_types: &Labels) -> DiseaseResult<Self> {
        let exposure_target = health.require(&params.exposure_target)?;
        if health.state(exposure_target).susceptible {
            return Err(DiseaseError::Config(format!(
                "exposure target {:?} is itself susceptible",
                params.exposure_target
            )));
        }

        let mut progressions: Vec<Option<Progression>> = vec![None; health.len()];
        for p in &params.progressions {
            let from = health.require(&p.from)?;
            let state = health.state(from);
            if state.susceptible || state.terminal {
                return Err(DiseaseError::Config(format!(
                    "state {:?} is susceptible or terminal and cannot have a progression",
                    p.from
                )));
            }
            if progressions[from.index()].is_some() {
                return Err(DiseaseError::Config(format!("duplicate progression for state {:?}", p.from)));
            }
            let rule = match &p.rule {
                ProgressionRule::After(dist) => Rule::After(Duration::compile(dist, &p.from)?),
                ProgressionRule::Hazard(h) if (0.0..=1.0).contains(h) => Rule::Hazard(*h),
                ProgressionRule::Hazard(h) => {
                    return Err(DiseaseError::Config(format!("state {:?}: hazard {h} outside [0, 1]", p.from)));
                }
            };
            if p.outcomes.is_empty() {
                return Err(DiseaseError::Config(format!("state {:?} has no outcomes", p.from)));
            }
            let targets = p
                .outcomes
                .iter()
                .map(|o| health.require(&o.to))
                .collect::<Result<Vec<_>, _>>()?;
            let choice = WeightedIndex::new(p.outcomes.iter().map(|o| o.weight))
                .map_err(|e| DiseaseError::Config(format!("state {:?} outcome weights: {e}", p.from)))?;
            progressions[from.index()] = Some(Progression { rule, targets, choice });
        }
        for h in health.ids() {
            let state = health.state(h);
            if !state.susceptible && !state.terminal && progressions[h.index()].is_none() {
                return Err(DiseaseError::Config(format!(
                    "state {:?} is neither susceptible nor terminal and has no progression",
                    health.name(h)
                )));
            }
        }

        let t = &params.transmission;
        check_rate("default", t.default_rate)?;
        let mut rates = vec![t.default_rate; location_types.len()];
        for (name, &rate) in &t.by_location_type {
            check_rate(name, rate)?;
            let kind = LocationTypeId(location_types.require(name)?);
            rates[kind.index()] = rate;
        }

        Ok(Self {
            exposure_target,
            progressions,
            rates,
            infectiousness: health.ids().map(|h| health.state(h).infectiousness).collect(),
            susceptible: health.ids().map(|h| health.state(h).susceptible).collect(),
            terminal: health.ids().map(|h| health.state(h).terminal).collect(),
            initial_infections: params.initial_infections,
            random_exposures: params.random_exposures_per_day,
        })
    }

    pub fn exposure_target(&self) -> HealthId {
        self.exposure_target
    }

    /// Per-tick transmission rate at a location of type `kind`.
    pub fn rate(&self, kind: LocationTypeId) -> f64 {
        self.rates.get(kind.index()).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn is_susceptible(&self, h: HealthId) -> bool {
        self.susceptible[h.index()]
    }

    #[inline]
    pub fn infectiousness(&self, h: HealthId) -> f64 {
        self.infectiousness[h.index()]
    }

    pub(crate) fn progression(&self, h: HealthId) -> Option<&Progression> {
        self.progressions.get(h.index()).and_then(Option::as_ref)
    }
}

fn check_rate(what: &str, rate: f64) -> DiseaseResult<()> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(DiseaseError::Config(format!("transmission rate for {what:?} must be finite and >= 0, got {rate}")))
    }
}

/// Probability of at least one transmission from a set of independent
/// contacts: `1 - Π (1 - rate × infectiousness)`, each factor clamped to
/// [0, 1].
pub fn exposure_probability(rate: f64, infectiousness: impl IntoIterator<Item = f64>) -> f64 {
    let escape: f64 = infectiousness
        .into_iter()
        .map(|i| 1.0 - (rate * i).clamp(0.0, 1.0))
        .product();
    1.0 - escape
}
