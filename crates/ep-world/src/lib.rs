//! `ep-world` — the authoritative world state store.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`agent`]    | `AgentStore` (SoA arrays), `TestStatus`                      |
//! | [`location`] | `LocationStore` (SoA arrays + occupancy index), `Coord`      |
//! | [`health`]   | `HealthModel`, `HealthState` — the legal health graph        |
//! | [`state`]    | `WorldState`, `FieldValue`, snapshots, `apply`               |
//! | [`builder`]  | `WorldBuilder`, `AgentSpec` (validating construction)        |
//! | [`loader`]   | CSV network loader                                           |
//! | [`error`]    | `WorldError`, `WorldResult`                                  |
//!
//! # Invariants
//!
//! - Every agent's location names an existing location.
//! - Outside the engine's commit, the occupancy index lists exactly the live
//!   agents at each location (dead agents keep their location field but are
//!   not listed).
//! - Health only moves along edges of the configured [`HealthModel`].

pub mod agent;
pub mod builder;
pub mod error;
pub mod health;
pub mod loader;
pub mod location;
pub mod state;

#[cfg(test)]
mod tests;

pub use agent::{AgentStore, TestStatus};
pub use builder::{AgentSpec, WorldBuilder};
pub use error::{WorldError, WorldResult};
pub use health::{HealthModel, HealthState};
pub use loader::{load_network_dir, load_network_readers};
pub use location::{Coord, LocationStore};
pub use state::{AgentSnapshot, FieldValue, LocationSnapshot, StateKey, WorldState};
