//! `ep-disease` — a generic compartmental disease state machine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`params`]  | `DiseaseParams` and friends (serde, JSON)                     |
//! | [`model`]   | `DiseaseModel` — parameters compiled against the health graph |
//! | [`module`]  | `DiseaseModule` — the bus module                              |
//! | [`error`]   | `DiseaseError`, `DiseaseResult`                               |
//!
//! # Typical wiring
//!
//! ```rust,ignore
//! let params = DiseaseParams::from_json_file(path)?;
//! let health = params.health_model()?;            // hand to WorldBuilder
//! let world  = WorldBuilder::new(acts, loc_types, ages, health).build()?;
//! let model  = DiseaseModel::compile(&params, &world.health, &world.location_types)?;
//! builder.module(DiseaseModule::new(model));
//! ```
//!
//! Per tick, on the committed state: susceptible agents sharing a location
//! with infectious agents are exposed with probability
//! `1 - Π (1 - rate(location type) × infectiousness)`, then every agent in a
//! non-terminal state with an exit rule is checked against its deadline or
//! hazard.

pub mod error;
pub mod model;
pub mod module;
pub mod params;


pub use error::{DiseaseError, DiseaseResult};
pub use model::{exposure_probability, DiseaseModel};
pub use module::DiseaseModule;
pub use params::{
    DiseaseParams, DurationDist, Outcome, ProgressionParams, ProgressionRule, StateParams, TransmissionParams,
};
