//! town — end-to-end run of the epidemic engine on a synthetic town.
//!
//! Two adults and a child per household commute between home, work or
//! school and leisure venues on a weekly rhythm while a six-state disease
//! spreads through shared locations.  Symptomatic testing, the laboratory
//! and quarantine run from the start; random testing is switched on after
//! two weeks, and schools close and a night curfew begins after three.
//!
//! ```text
//! RUST_LOG=debug cargo run -p town -- output/town
//! ```

mod town;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ep_behavior::{MarkovBehavior, MarkovConfig};
use ep_bus::Module;
use ep_core::{SimConfig, SimRng, Tick};
use ep_disease::{DiseaseModel, DiseaseModule, DiseaseParams};
use ep_interventions::{
    Curfew, InterventionParams, Laboratory, LocationClosure, Quarantine, RandomTesting, SymptomaticTesting,
};
use ep_output::{CsvWriter, SimOutputObserver};
use ep_sim::{ChangeLog, InterventionSchedule, SimBuilder, Tee};

use town::{build_town, weekly_matrices, TownSize};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:                    u64 = 42;
const START_UNIX_SECS:         i64 = 1_704_067_200; // Monday 2024-01-01 00:00 UTC
const TICK_DURATION_SECS:      u32 = 3_600;         // 1 tick = 1 hour
const SIM_DAYS:                u64 = 60;
const RANDOM_TESTING_FROM_DAY: u64 = 14;
const LOCKDOWN_FROM_DAY:       u64 = 21;

const TOWN: TownSize = TownSize { households: 400, workplaces: 30, schools: 3, venues: 12 };

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("output/town"));

    // 1. Parameters.
    let disease = DiseaseParams::from_json_str(include_str!("../data/disease.json"))
        .context("parsing disease parameters")?;
    let policies = InterventionParams::from_json_str(include_str!("../data/interventions.json"))
        .context("parsing intervention parameters")?;

    // 2. Town, laid out from its own stream so the run's sequence is untouched.
    let mut town_rng = SimRng::new(SEED).child(0);
    let world = build_town(&TOWN, disease.health_model()?, &mut town_rng)?;
    info!(agents = world.agent_count(), locations = world.location_count(), "town built");

    // 3. Modules.
    let mut modules: Vec<Box<dyn Module>> = vec![
        Box::new(MarkovBehavior::new(weekly_matrices()?, MarkovConfig::default())),
        Box::new(DiseaseModule::new(DiseaseModel::compile(&disease, &world.health, &world.location_types)?)),
    ];
    if let Some(cfg) = policies.symptomatic_testing {
        modules.push(Box::new(SymptomaticTesting::new(cfg, &world.health)?));
    }
    if let Some(cfg) = policies.laboratory {
        modules.push(Box::new(Laboratory::new(cfg, &world.health)?));
    }
    if let Some(cfg) = policies.quarantine {
        modules.push(Box::new(Quarantine::new(cfg, &world)?));
    }

    let config = SimConfig::for_days(START_UNIX_SECS, TICK_DURATION_SECS, SIM_DAYS, SEED);
    let mut schedule = InterventionSchedule::new();
    if let Some(cfg) = policies.random_testing {
        modules.push(Box::new(RandomTesting::new(cfg)?));
        let from = Tick(config.make_clock()?.ticks_for_days(RANDOM_TESTING_FROM_DAY));
        schedule = schedule.start_disabled("random_testing").enable_at(from, "random_testing");
    }
    let lockdown = Tick(config.make_clock()?.ticks_for_days(LOCKDOWN_FROM_DAY));
    if let Some(cfg) = policies.location_closure {
        modules.push(Box::new(LocationClosure::new(cfg, &world)?));
        schedule = schedule.start_disabled("location_closure").enable_at(lockdown, "location_closure");
    }
    if let Some(cfg) = policies.curfew {
        modules.push(Box::new(Curfew::new(cfg, &world)?));
        schedule = schedule.start_disabled("curfew").enable_at(lockdown, "curfew");
    }

    // 4. Engine.
    let mut sim = modules
        .into_iter()
        .fold(SimBuilder::new(config.clone(), world), SimBuilder::boxed_module)
        .schedule(schedule)
        .build()?;
    info!(ticks = config.effective_ticks(), modules = sim.registry().len(), "simulation ready");

    // 5. Output.
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let mut output = SimOutputObserver::new(CsvWriter::new(&out_dir)?, &config);
    let mut log = ChangeLog::new();

    // 6. Run.
    let t0 = Instant::now();
    sim.run(&mut Tee(&mut output, &mut log))?;
    let elapsed = t0.elapsed();
    if let Some(e) = output.take_error() {
        return Err(e).context("writing output");
    }

    // 7. Summary.
    println!("Simulation complete in {:.3} s ({} ticks)", elapsed.as_secs_f64(), sim.ticks_run());
    println!("Output written to {}", out_dir.display());
    println!();

    let mut by_field: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &log.records {
        *by_field.entry(record.change.field_name()).or_default() += 1;
    }
    let overridden: usize = log.summaries.iter().map(|s| s.overridden).sum();
    println!("{:<12} {:>10}", "Field", "Changes");
    println!("{}", "-".repeat(23));
    for (field, n) in &by_field {
        println!("{field:<12} {n:>10}");
    }
    println!("{:<12} {:>10}", "(overridden)", overridden);
    println!();

    let world = sim.world();
    println!("{:<16} {:>8}", "Health state", "Agents");
    println!("{}", "-".repeat(25));
    for h in world.health.ids() {
        println!("{:<16} {:>8}", world.health.name(h), world.health_count(h));
    }
    let quarantined = world.agents.agent_ids().filter(|&a| world.is_quarantined(a)).count();
    println!("{:<16} {:>8}", "(quarantined)", quarantined);

    Ok(())
}
