//! `ep-core` — foundational types for the epidemic simulation engine.
//!
//! This crate is a dependency of every other `ep-*` crate.  It has no `ep-*`
//! dependencies and few external ones (`rand`, `chrono`, `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `LocationId`, `ActivityId`, `HealthId`, …       |
//! | [`labels`]      | `Labels` — name ↔ index tables for enumerated categories   |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                            |
//! | [`rng`]         | `SimRng` — the single run-wide deterministic source        |
//! | [`deferred`]    | `DeferredQueue<T>` — tick-keyed delayed work               |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, ticks and configs.  |

pub mod deferred;
pub mod error;
pub mod ids;
pub mod labels;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use deferred::DeferredQueue;
pub use error::{CoreError, CoreResult};
pub use ids::{ActivityId, AgeClassId, AgentId, HealthId, LocationId, LocationTypeId};
pub use labels::Labels;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
