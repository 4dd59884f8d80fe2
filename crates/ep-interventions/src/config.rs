//! Serde-deserializable policy parameters.
//!
//! All delays are in days and converted to ticks (rounding up) against the
//! run's clock when the work is scheduled.  State, activity and location
//! type names are resolved to ids by each module's constructor.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "random_testing":      { "tests_per_day": 20, "invitation_delay_days": 1.0 },
//!   "symptomatic_testing": { "probability": 0.5, "onset_to_booking_days": 0.5,
//!                            "symptomatic_states": ["symptomatic"] },
//!   "laboratory":          { "prob_false_positive": 0.0, "prob_false_negative": 0.1,
//!                            "detectable_states": ["exposed", "symptomatic"],
//!                            "symptomatic_states": ["symptomatic"],
//!                            "sampling_delay_days_symptomatic": 0.5,
//!                            "sampling_delay_days_no_symptoms": 2.0,
//!                            "result_delay_days": 1.0 },
//!   "quarantine":          { "default_duration_days": 14.0, "early_release_days": 0.0,
//!                            "home_activity": "house", "exempt_location_types": [],
//!                            "release_when_disabled": false },
//!   "location_closure":    { "location_types": ["school"], "home_activity": "house" },
//!   "curfew":              { "start_hour": 21, "end_hour": 5, "location_types": ["leisure"],
//!                            "home_activity": "house" },
//!   "work_from_home":      { "probability": 0.3, "work_activity": "work",
//!                            "location_types": ["office"], "home_activity": "house" },
//!   "hospitalisation":     { "hospital_states": ["severe"], "hospital_activity": "hospital",
//!                            "hospital_location_type": "hospital", "home_activity": "house" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{InterventionError, InterventionResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomTestingConfig {
    /// Agents invited for testing each midnight.
    pub tests_per_day: u32,
    /// Invitation to booking.
    #[serde(default)]
    pub invitation_delay_days: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymptomaticTestingConfig {
    /// Chance that an agent developing symptoms books a test.
    pub probability: f64,
    #[serde(default)]
    pub onset_to_booking_days: f64,
    pub symptomatic_states: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaboratoryConfig {
    #[serde(default)]
    pub prob_false_positive: f64,
    #[serde(default)]
    pub prob_false_negative: f64,
    /// States in which a correct test reads positive.
    pub detectable_states: Vec<String>,
    /// States that get the faster sampling slot.
    #[serde(default)]
    pub symptomatic_states: Vec<String>,
    #[serde(default)]
    pub sampling_delay_days_symptomatic: f64,
    #[serde(default)]
    pub sampling_delay_days_no_symptoms: f64,
    /// Sample to reported result.
    #[serde(default)]
    pub result_delay_days: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuarantineConfig {
    pub default_duration_days: f64,
    /// Delay between a negative result and release.
    #[serde(default)]
    pub early_release_days: f64,
    /// Activity whose first permitted location is the agent's home.
    pub home_activity: String,
    /// Location types a quarantined agent is not pulled home from
    /// (hospitals, for instance).
    #[serde(default)]
    pub exempt_location_types: Vec<String>,
    /// Stop holding quarantined agents at home while the policy is
    /// disabled.  They stay flagged and are held again on re-enable.
    #[serde(default)]
    pub release_when_disabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocationClosureConfig {
    /// Location types behavior may no longer send agents to.
    pub location_types: Vec<String>,
    pub home_activity:  String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurfewConfig {
    /// Hour of day (0-23) the curfew begins.
    pub start_hour:     u32,
    /// Hour of day the curfew lifts; earlier than `start_hour` to span
    /// midnight.
    pub end_hour:       u32,
    pub location_types: Vec<String>,
    pub home_activity:  String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkFromHomeConfig {
    /// Chance, redrawn each midnight, that an affected agent stays home.
    pub probability:    f64,
    pub work_activity:  String,
    /// Workplace types whose staff are affected.
    pub location_types: Vec<String>,
    pub home_activity:  String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HospitalisationConfig {
    /// Health states that put an agent in hospital.
    pub hospital_states:        Vec<String>,
    pub hospital_activity:      String,
    pub hospital_location_type: String,
    /// Where a discharged patient goes.
    pub home_activity:          String,
}

/// Parameters for every policy; absent policies are not installed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterventionParams {
    #[serde(default)]
    pub random_testing:      Option<RandomTestingConfig>,
    #[serde(default)]
    pub symptomatic_testing: Option<SymptomaticTestingConfig>,
    #[serde(default)]
    pub laboratory:          Option<LaboratoryConfig>,
    #[serde(default)]
    pub quarantine:          Option<QuarantineConfig>,
    #[serde(default)]
    pub location_closure:    Option<LocationClosureConfig>,
    #[serde(default)]
    pub curfew:              Option<CurfewConfig>,
    #[serde(default)]
    pub work_from_home:      Option<WorkFromHomeConfig>,
    #[serde(default)]
    pub hospitalisation:     Option<HospitalisationConfig>,
}

impl InterventionParams {
    pub fn from_json_str(s: &str) -> InterventionResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: &Path) -> InterventionResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

pub(crate) fn check_probability(what: &str, p: f64) -> InterventionResult<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(InterventionError::Config(format!("{what} must lie in [0, 1], got {p}")))
    }
}

pub(crate) fn check_delay(what: &str, days: f64) -> InterventionResult<()> {
    if days.is_finite() && days >= 0.0 {
        Ok(())
    } else {
        Err(InterventionError::Config(format!("{what} must be finite and >= 0 days, got {days}")))
    }
}

/// Membership mask over the location types named in `names`.
pub(crate) fn location_type_mask(world: &ep_world::WorldState, names: &[String]) -> InterventionResult<Vec<bool>> {
    let mut mask = vec![false; world.location_types.len()];
    for name in names {
        mask[world.location_types.require(name)? as usize] = true;
    }
    Ok(mask)
}

/// Membership mask over the health states named in `names`.
pub(crate) fn state_mask(health: &ep_world::HealthModel, names: &[String]) -> InterventionResult<Vec<bool>> {
    let mut mask = vec![false; health.len()];
    for name in names {
        mask[health.require(name)?.index()] = true;
    }
    Ok(mask)
}
