//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `state_changes`, `tick_summaries` and `health_counts`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{HealthCountRow, OutputResult, StateChangeRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS state_changes (
                 tick           INTEGER NOT NULL,
                 unix_time_secs INTEGER NOT NULL,
                 agent          INTEGER NOT NULL,
                 field          TEXT    NOT NULL,
                 from_value     TEXT    NOT NULL,
                 to_value       TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick           INTEGER PRIMARY KEY,
                 unix_time_secs INTEGER NOT NULL,
                 requests       INTEGER NOT NULL,
                 overridden     INTEGER NOT NULL,
                 merged         INTEGER NOT NULL,
                 committed      INTEGER NOT NULL,
                 dropped        INTEGER NOT NULL,
                 notifications  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS health_counts (
                 tick  INTEGER NOT NULL,
                 state TEXT    NOT NULL,
                 count INTEGER NOT NULL,
                 PRIMARY KEY (tick, state)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_changes(&mut self, rows: &[StateChangeRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO state_changes \
                 (tick, unix_time_secs, agent, field, from_value, to_value) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.unix_time_secs,
                    row.agent,
                    row.field,
                    row.from,
                    row.to,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, unix_time_secs, requests, overridden, merged, committed, dropped, notifications) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                row.tick as i64,
                row.unix_time_secs,
                row.requests as i64,
                row.overridden as i64,
                row.merged as i64,
                row.committed as i64,
                row.dropped as i64,
                row.notifications as i64,
            ],
        )?;
        Ok(())
    }

    fn write_health_counts(&mut self, rows: &[HealthCountRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO health_counts (tick, state, count) VALUES (?1, ?2, ?3)")?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.state, row.count as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
