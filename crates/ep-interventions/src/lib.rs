//! `ep-interventions` — testing, laboratory, quarantine, hospital and
//! movement-restriction policies.
//!
//! Every policy is an ordinary [`ep_bus::Module`] of kind `Intervention`:
//! it reacts to notifications, keeps its own bookkeeping in
//! [`ep_core::DeferredQueue`]s and emits requests.  None of them writes the
//! world or talks to another policy directly.
//!
//! | Module              | Contents                                               |
//! |---------------------|--------------------------------------------------------|
//! | [`config`]          | serde parameter structs, `InterventionParams` (JSON)   |
//! | [`testing`]         | `RandomTesting`, `SymptomaticTesting`                  |
//! | [`laboratory`]      | `Laboratory`                                           |
//! | [`quarantine`]      | `Quarantine`                                           |
//! | [`restrictions`]    | `LocationClosure`, `Curfew`, `WorkFromHome`            |
//! | [`hospitalisation`] | `Hospitalisation`                                      |
//! | [`error`]           | `InterventionError`, `InterventionResult`              |
//!
//! # Pipeline
//!
//! ```text
//! RandomTesting / SymptomaticTesting ──request.testing.book_test──▶ engine
//! engine ──notify.testing.booked──▶ Laboratory ──request.testing.result──▶ engine
//! engine ──notify.testing.result──▶ Quarantine ──request.quarantine.*──▶ engine
//! ```
//!
//! Quarantine and the movement restrictions act in the engine's review
//! step: they see the moves behavior queued for the tick and answer the
//! ones they forbid with higher-precedence home requests.
//!
//! While disabled (see the engine's intervention schedule) a policy starts
//! no new work; anything already scheduled still completes.

pub mod config;
pub mod error;
pub mod hospitalisation;
pub mod laboratory;
pub mod quarantine;
pub mod restrictions;
pub mod testing;

#[cfg(test)]
mod tests;

pub use config::{
    CurfewConfig, HospitalisationConfig, InterventionParams, LaboratoryConfig, LocationClosureConfig,
    QuarantineConfig, RandomTestingConfig, SymptomaticTestingConfig, WorkFromHomeConfig,
};
pub use error::{InterventionError, InterventionResult};
pub use laboratory::Laboratory;
pub use hospitalisation::Hospitalisation;
pub use quarantine::Quarantine;
pub use restrictions::{Curfew, LocationClosure, WorkFromHome};
pub use testing::{RandomTesting, SymptomaticTesting};
