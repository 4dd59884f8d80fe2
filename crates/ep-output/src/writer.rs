//! The `OutputWriter` trait implemented by all backend writers.

use crate::{HealthCountRow, OutputResult, StateChangeRow, TickSummaryRow};

/// Trait implemented by the CSV and SQLite writers.
///
/// Errors are returned to the caller; [`SimOutputObserver`][crate::SimOutputObserver]
/// stores the first one since observer callbacks cannot fail.
pub trait OutputWriter {
    /// Write a batch of committed changes, in commit order.
    fn write_changes(&mut self, rows: &[StateChangeRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write the per-state population counts for one tick.
    fn write_health_counts(&mut self, rows: &[HealthCountRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
