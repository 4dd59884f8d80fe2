//! `ep-sim` — the tick loop engine.
//!
//! # Run lifecycle
//!
//! ```text
//! not_started ──start()──▶ running ──step()*──▶ running ──finish()──▶ finished
//!
//! start():  notify.time.start_simulation
//! step():   ① Collect  — notify.time.tick, notify.time.midnight on a day
//!                        boundary; modules queue requests, then
//!                        review the queue and add overrides
//!           ② Resolve  — group by (agent, field); precedence; conflicts
//!           ③ Commit   — agents ascending; health, quarantine, test
//!                        booking, test result, activity, location
//!           ④ Notify   — one notification per committed change
//! finish(): notify.time.end_simulation
//! ```
//!
//! Requests emitted while handling a notification are always resolved in
//! the following resolve phase; nothing chains within a phase.
//!
//! # Fatal conditions
//!
//! Every one of these aborts the run with a [`SimError`] naming the tick
//! and the agent:
//!
//! - two different values for one field at the same precedence rank
//! - a request for an agent already dead at the start of the tick
//! - a health change that is not an edge of the health graph
//! - an (activity, location) pair outside the agent's permitted set
//! - a module handler returning an error
//!
//! # Quick-start
//!
//! ```rust,ignore
//! let mut sim = SimBuilder::new(config, world)
//!     .module(MarkovBehavior::new(matrices, MarkovConfig::default()))
//!     .module(DiseaseModule::new(disease))
//!     .build()?;
//! let mut log = ChangeLog::new();
//! sim.run(&mut log)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod precedence;
pub mod record;
pub mod schedule;
pub mod sim;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{ChangeLog, NoopObserver, SimObserver, Tee};
pub use precedence::{resolve, Field, Precedence, Resolution};
pub use record::{Change, ChangeRecord, TickSummary};
pub use schedule::InterventionSchedule;
pub use sim::{Phase, RunState, Sim};
