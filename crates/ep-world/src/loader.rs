//! CSV network loader.
//!
//! Networks are produced by external tooling; this reads the three-file
//! interchange form into a [`WorldBuilder`] whose labels and health model
//! were set up by the caller.
//!
//! # CSV format
//!
//! `locations.csv` — ids must run 0, 1, 2, … in file order; `capacity` may
//! be empty:
//!
//! ```csv
//! location_id,type,x,y,capacity
//! 0,house,0.0,0.0,
//! 1,work,10.5,3.0,40
//! ```
//!
//! `agents.csv` — ids must run 0, 1, 2, … in file order; `health` may be
//! empty for the model's initial state:
//!
//! ```csv
//! agent_id,age_class,activity,location_id,health
//! 0,adult,house,0,
//! ```
//!
//! `permitted.csv` — any order:
//!
//! ```csv
//! agent_id,activity,location_id
//! 0,house,0
//! 0,work,1
//! ```

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use ep_core::{ActivityId, AgeClassId, LocationId, LocationTypeId};

use crate::{AgentSpec, Coord, WorldBuilder, WorldError, WorldResult, WorldState};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LocationRecord {
    location_id: u32,
    #[serde(rename = "type")]
    kind:        String,
    x:           f64,
    y:           f64,
    capacity:    Option<u32>,
}

#[derive(Deserialize)]
struct AgentRecord {
    agent_id:    u32,
    age_class:   String,
    activity:    String,
    location_id: u32,
    health:      Option<String>,
}

#[derive(Deserialize)]
struct PermittedRecord {
    agent_id:    u32,
    activity:    String,
    location_id: u32,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load `locations.csv`, `agents.csv` and `permitted.csv` from `dir` and
/// build the world.
pub fn load_network_dir(dir: &Path, builder: WorldBuilder) -> WorldResult<WorldState> {
    let open = |name: &str| std::fs::File::open(dir.join(name)).map_err(WorldError::Io);
    load_network_readers(open("locations.csv")?, open("agents.csv")?, open("permitted.csv")?, builder)
}

/// Like [`load_network_dir`] but accepts any `Read` sources.
///
/// Useful for testing (pass a `std::io::Cursor`).
pub fn load_network_readers<L: Read, A: Read, P: Read>(
    locations: L,
    agents: A,
    permitted: P,
    mut builder: WorldBuilder,
) -> WorldResult<WorldState> {
    // ── Locations ─────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(locations);
    for result in rdr.deserialize::<LocationRecord>() {
        let row = result.map_err(|e| WorldError::Parse(e.to_string()))?;
        let expected = builder.location_count() as u32;
        if row.location_id != expected {
            return Err(WorldError::Parse(format!(
                "locations.csv: expected location_id {expected}, found {}",
                row.location_id
            )));
        }
        let kind = LocationTypeId(builder.location_types().require(row.kind.trim())?);
        builder.add_location(kind, Coord::new(row.x, row.y), row.capacity);
    }

    // ── Permitted sets, grouped by agent ──────────────────────────────────
    let mut rdr = csv::Reader::from_reader(permitted);
    let mut by_agent: HashMap<u32, Vec<(ActivityId, LocationId)>> = HashMap::new();
    for result in rdr.deserialize::<PermittedRecord>() {
        let row = result.map_err(|e| WorldError::Parse(e.to_string()))?;
        let activity = ActivityId(builder.activities().require(row.activity.trim())?);
        by_agent.entry(row.agent_id).or_default().push((activity, LocationId(row.location_id)));
    }

    // ── Agents ────────────────────────────────────────────────────────────
    let mut rdr = csv::Reader::from_reader(agents);
    for result in rdr.deserialize::<AgentRecord>() {
        let row = result.map_err(|e| WorldError::Parse(e.to_string()))?;
        let expected = builder.agent_count() as u32;
        if row.agent_id != expected {
            return Err(WorldError::Parse(format!(
                "agents.csv: expected agent_id {expected}, found {}",
                row.agent_id
            )));
        }
        let age_class = AgeClassId(builder.age_classes().require(row.age_class.trim())?);
        let activity = ActivityId(builder.activities().require(row.activity.trim())?);
        let mut spec = AgentSpec::new(age_class, activity, LocationId(row.location_id));
        if let Some(name) = row.health.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            spec = spec.with_health(builder.health().require(name)?);
        }
        for (activity, loc) in by_agent.remove(&row.agent_id).unwrap_or_default() {
            spec = spec.permit(activity, [loc]);
        }
        builder.add_agent(spec);
    }

    if let Some(orphan) = by_agent.keys().min() {
        return Err(WorldError::Parse(format!(
            "permitted.csv references unknown agent_id {orphan}"
        )));
    }

    builder.build()
}
