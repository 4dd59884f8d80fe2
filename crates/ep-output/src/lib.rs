//! `ep-output` — change-log writers for the epidemic simulation engine.
//!
//! Two backends are provided:
//!
//! | Feature   | Backend | Files created                                                  |
//! |-----------|---------|----------------------------------------------------------------|
//! | *(none)*  | CSV     | `state_changes.csv`, `tick_summaries.csv`, `health_counts.csv` |
//! | `sqlite`  | SQLite  | `output.db`                                                    |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `ep_sim::SimObserver`.  Changes are buffered for the
//! tick and written once the tick's notifications have been delivered, so
//! a file never holds a partial tick.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ep_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, sim.config());
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{HealthCountRow, StateChangeRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
