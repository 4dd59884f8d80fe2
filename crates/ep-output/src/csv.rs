//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `state_changes.csv`
//! - `tick_summaries.csv`
//! - `health_counts.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{HealthCountRow, OutputResult, StateChangeRow, TickSummaryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    changes:   Writer<File>,
    summaries: Writer<File>,
    counts:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the three CSV files in `dir` (which must exist) and write
    /// the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut changes = Writer::from_path(dir.join("state_changes.csv"))?;
        changes.write_record(["tick", "unix_time_secs", "agent", "field", "from", "to"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "unix_time_secs",
            "requests",
            "overridden",
            "merged",
            "committed",
            "dropped",
            "notifications",
        ])?;

        let mut counts = Writer::from_path(dir.join("health_counts.csv"))?;
        counts.write_record(["tick", "state", "count"])?;

        Ok(Self { changes, summaries, counts, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_changes(&mut self, rows: &[StateChangeRow]) -> OutputResult<()> {
        for row in rows {
            self.changes.write_record([
                row.tick.to_string().as_str(),
                row.unix_time_secs.to_string().as_str(),
                row.agent.to_string().as_str(),
                row.field,
                row.from.as_str(),
                row.to.as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.unix_time_secs.to_string(),
            row.requests.to_string(),
            row.overridden.to_string(),
            row.merged.to_string(),
            row.committed.to_string(),
            row.dropped.to_string(),
            row.notifications.to_string(),
        ])?;
        Ok(())
    }

    fn write_health_counts(&mut self, rows: &[HealthCountRow]) -> OutputResult<()> {
        for row in rows {
            self.counts.write_record([
                row.tick.to_string().as_str(),
                row.state.as_str(),
                row.count.to_string().as_str(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.changes.flush()?;
        self.summaries.flush()?;
        self.counts.flush()?;
        Ok(())
    }
}
