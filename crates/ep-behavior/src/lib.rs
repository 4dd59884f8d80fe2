//! `ep-behavior` — the Markov activity model.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`matrix`]  | `TransitionMatrices`, `TransitionMatricesBuilder` (validated) |
//! | [`loader`]  | CSV matrix loader                                             |
//! | [`markov`]  | `MarkovBehavior` module, `MarkovConfig`, `LocationChoice`     |
//! | [`error`]   | `BehaviorError`, `BehaviorResult`                             |
//!
//! Every tick, each live agent draws its next activity from the row for
//! (age class, current activity, time-of-week bucket).  When the activity
//! changes the module picks a location from the agent's permitted set for
//! the new activity and requests both changes.

pub mod error;
pub mod loader;
pub mod markov;
pub mod matrix;


pub use error::{BehaviorError, BehaviorResult};
pub use loader::{load_matrices_csv, load_matrices_reader};
pub use markov::{LocationChoice, MarkovBehavior, MarkovConfig};
pub use matrix::{TransitionMatrices, TransitionMatricesBuilder, TransitionMatrix};
