//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use ep_core::{SimConfig, Tick};
use ep_sim::{ChangeRecord, SimObserver, TickSummary};
use ep_world::WorldState;

use crate::row::{HealthCountRow, StateChangeRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes the change log, tick summaries and health
/// counts to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:             W,
    start_unix_secs:    i64,
    tick_duration_secs: u32,
    /// Changes of the tick in progress.
    pending:            Vec<StateChangeRow>,
    changes_written:    u64,
    last_error:         Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for wall-clock
    /// conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            start_unix_secs:    config.start_unix_secs,
            tick_duration_secs: config.tick_duration_secs,
            pending:            Vec::new(),
            changes_written:    0,
            last_error:         None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Number of change rows handed to the writer so far.
    pub fn changes_written(&self) -> u64 {
        self.changes_written
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn unix_time(&self, tick: Tick) -> i64 {
        self.start_unix_secs + tick.0 as i64 * self.tick_duration_secs as i64
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let result = self.writer.write_changes(&self.pending);
        self.changes_written += self.pending.len() as u64;
        self.pending.clear();
        self.store_err(result);
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_change(&mut self, record: &ChangeRecord, world: &WorldState) {
        let (from, to) = record.change.labels(world);
        self.pending.push(StateChangeRow {
            tick: record.tick.0,
            unix_time_secs: self.unix_time(record.tick),
            agent: record.agent.0,
            field: record.change.field_name(),
            from,
            to,
        });
    }

    fn on_tick_end(&mut self, summary: &TickSummary, world: &WorldState) {
        self.flush_pending();

        let row = TickSummaryRow {
            tick:           summary.tick.0,
            unix_time_secs: self.unix_time(summary.tick),
            requests:       summary.requests as u64,
            overridden:     summary.overridden as u64,
            merged:         summary.merged as u64,
            committed:      summary.committed as u64,
            dropped:        summary.dropped as u64,
            notifications:  summary.notifications as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);

        let counts: Vec<HealthCountRow> = world
            .health
            .ids()
            .map(|h| HealthCountRow {
                tick:  summary.tick.0,
                state: world.health.name(h).to_owned(),
                count: world.health_count(h),
            })
            .collect();
        let result = self.writer.write_health_counts(&counts);
        self.store_err(result);
    }

    fn on_end(&mut self, _final_tick: Tick, _world: &WorldState) {
        self.flush_pending();
        let result = self.writer.finish();
        self.store_err(result);
    }
}
