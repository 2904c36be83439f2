//! Formicary Headless Simulation Harness
//!
//! Runs seeded colonies entirely in-process and checks the structural
//! invariants after every tick. No rendering, no input.
//!
//! Usage:
//!   cargo run -p formicary-simtest
//!   cargo run -p formicary-simtest -- --verbose --ticks 6000 --seed 7
//!   cargo run -p formicary-simtest -- --config colony.json --json

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use formicary_core::prelude::*;
use formicary_logic::config::ColonyConfig;
use formicary_logic::jobs::Job;
use formicary_logic::{Cell, Grid, GridBounds, Pathfinder, TerrainKind};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const DEFAULT_TICKS: u64 = 3000;
const TICK_SECONDS: f32 = 0.1;
const REPLAY_TICKS: u64 = 600;

// ── Command line ────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "formicary-simtest",
    version,
    about = "Run seeded colonies headless and check their invariants"
)]
struct Options {
    /// Print every check and log at debug level.
    #[arg(long)]
    verbose: bool,
    /// Emit the report as JSON on stdout.
    #[arg(long)]
    json: bool,
    /// Colony config JSON; defaults apply to missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks of 0.1s to run the full colony for.
    #[arg(long, default_value_t = DEFAULT_TICKS)]
    ticks: u64,
    /// Override the config seed.
    #[arg(long)]
    seed: Option<u64>,
}

fn load_config(options: &Options) -> Result<ColonyConfig> {
    let mut config = match &options.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            ColonyConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ColonyConfig::default(),
    };
    if let Some(seed) = options.seed {
        config.seed = seed;
    }
    Ok(config)
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    ticks: u64,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
    stats: Option<&'a ColonyStats>,
}

fn main() -> Result<()> {
    let options = Options::parse();

    let default_filter = if options.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(&options)?;
    let ticks = options.ticks;
    let verbose = options.verbose;
    if !options.json {
        println!("=== Formicary Simulation Harness (seed {}) ===\n", config.seed);
    }

    let mut results = Vec::new();

    // 1. Configuration
    results.extend(validate_config(&config, verbose));
    if results.iter().any(|r| !r.passed) {
        return finish(&options, config.seed, ticks, &results, None);
    }

    // 2. Nest generation
    results.extend(validate_generation(&config, verbose));

    // 3. Pathfinding on synthetic grids
    results.extend(validate_pathfinding(verbose));

    // 4. Full colony run
    let (colony_results, stats) = run_colony(&config, ticks, verbose)?;
    results.extend(colony_results);

    // 5. Seeded replay
    results.extend(validate_replay(&config, ticks.min(REPLAY_TICKS), verbose)?);

    finish(&options, config.seed, ticks, &results, Some(&stats))
}

fn finish(
    options: &Options,
    seed: u64,
    ticks: u64,
    results: &[TestResult],
    stats: Option<&ColonyStats>,
) -> Result<()> {
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if options.json {
        let report = Report {
            seed,
            ticks,
            passed,
            failed,
            results,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        for r in results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || options.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        if let Some(stats) = stats {
            print_stats(stats);
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        bail!("{} of {} checks failed", failed, results.len());
    }
    Ok(())
}

fn print_stats(stats: &ColonyStats) {
    println!("\n--- Colony after {:.1}s (day {}) ---", stats.elapsed, stats.day);
    println!(
        "  population {} (workers {}, architects {}, harvesters {}, queens {})",
        stats.population.total(),
        stats.population.workers,
        stats.population.architects,
        stats.population.harvesters,
        stats.population.queens
    );
    println!(
        "  idle {}, walking {}, working {}",
        stats.idle, stats.walking, stats.working
    );
    println!(
        "  food {:.2}, open tasks {}, food items {}, corpses {}",
        stats.food, stats.tasks, stats.food_items, stats.corpses
    );
    println!(
        "  births {}, deaths {}, tasks done {}, tiles dug {}",
        stats.counters.births,
        stats.counters.deaths,
        stats.counters.tasks_completed,
        stats.counters.tiles_dug
    );
    println!(
        "  path searches {}, overruns {}",
        stats.path_searches, stats.path_overruns
    );
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn validate_config(config: &ColonyConfig, _verbose: bool) -> Vec<TestResult> {
    log::info!("--- Configuration ---");
    let mut results = Vec::new();

    let validation = config.validate();
    results.push(TestResult {
        name: "config_valid".into(),
        passed: validation.is_ok(),
        detail: match validation {
            Ok(()) => "all sections within range".into(),
            Err(e) => e.to_string(),
        },
    });

    let bounds = config.grid.bounds();
    results.push(TestResult {
        name: "config_grid_size".into(),
        passed: bounds.cell_count() > 0,
        detail: format!("{}x{} cells", bounds.width(), bounds.height()),
    });

    results
}

// ── 2. Nest generation ──────────────────────────────────────────────────

fn validate_generation(config: &ColonyConfig, _verbose: bool) -> Vec<TestResult> {
    log::info!("--- Nest Generation ---");
    let mut results = Vec::new();

    let engine = match ColonyEngine::new(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            results.push(TestResult {
                name: "generation_engine".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let grid = engine.grid();

    let entrance = Cell::new(config.grid.entrance_x, config.grid.entrance_row);
    results.push(TestResult {
        name: "generation_entrance".into(),
        passed: grid.terrain(entrance) == Some(TerrainKind::Entrance),
        detail: format!("entrance at {:?}", entrance),
    });

    let rooms = grid.count_kind(TerrainKind::RoyalRoom);
    results.push(TestResult {
        name: "generation_royal_room".into(),
        passed: rooms == 6,
        detail: format!("{} royal room tiles", rooms),
    });

    results.push(TestResult {
        name: "generation_walkability".into(),
        passed: grid.walkability_consistent(),
        detail: "walkability matrix matches terrain".into(),
    });

    let population = engine.population();
    results.push(TestResult {
        name: "generation_founders".into(),
        passed: population.queens == 1
            && population.workers == config.agents.initial_workers
            && population.architects == config.agents.initial_architects
            && population.harvesters == config.agents.initial_harvesters,
        detail: format!("{} founders including the queen", population.total()),
    });

    let queen_home = engine
        .agent_views()
        .iter()
        .find(|v| v.job == Job::Queen)
        .map(|v| grid.terrain(v.cell));
    results.push(TestResult {
        name: "generation_queen_in_room".into(),
        passed: queen_home == Some(Some(TerrainKind::RoyalRoom)),
        detail: "queen starts inside the royal room".into(),
    });

    let violations = engine.invariant_violations();
    results.push(TestResult {
        name: "generation_invariants".into(),
        passed: violations.is_empty(),
        detail: violations
            .first()
            .cloned()
            .unwrap_or_else(|| "fresh colony is consistent".into()),
    });

    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(_verbose: bool) -> Vec<TestResult> {
    log::info!("--- Pathfinding ---");
    let mut results = Vec::new();
    let mut pathfinder = Pathfinder::new(99_999);

    // 5x5 open field with one rock in the middle
    let mut field = Grid::new(GridBounds::new(0, 5, 0, 5, -1), TerrainKind::Empty);
    field.replace_tile(Cell::new(2, 2), TerrainKind::Rock);

    let same = pathfinder.find_path(&field, Cell::new(1, 1), Cell::new(1, 1), true);
    results.push(TestResult {
        name: "pathfind_same_cell".into(),
        passed: same.as_deref() == Some(&[Cell::new(1, 1)][..]),
        detail: "start == goal → single cell".into(),
    });

    let detour = pathfinder.find_path(&field, Cell::new(0, 2), Cell::new(4, 2), true);
    results.push(TestResult {
        name: "pathfind_around_rock".into(),
        passed: detour.as_ref().is_some_and(|p| {
            p.len() == 7 && !p.contains(&Cell::new(2, 2)) && p.windows(2).all(|w| w[0].is_adjacent(w[1]))
        }),
        detail: format!("(0,2)→(4,2) = {:?} cells", detour.as_ref().map(Vec::len)),
    });

    let into_rock = pathfinder.find_path(&field, Cell::new(0, 2), Cell::new(2, 2), true);
    results.push(TestResult {
        name: "pathfind_blocked_goal".into(),
        passed: into_rock.is_none(),
        detail: "solid goal with include-destination → none".into(),
    });

    let beside_rock = pathfinder.find_path(&field, Cell::new(0, 2), Cell::new(2, 2), false);
    results.push(TestResult {
        name: "pathfind_exclude_destination".into(),
        passed: beside_rock
            .as_ref()
            .is_some_and(|p| p.len() == 3 && p.last() == Some(&Cell::new(2, 2))),
        detail: "solid goal with exclude-destination ends on it".into(),
    });
    results.push(TestResult {
        name: "pathfind_grid_untouched".into(),
        passed: !field.is_walkable(Cell::new(2, 2)) && field.walkability_consistent(),
        detail: "exclude mode leaves the matrix alone".into(),
    });

    // wall splitting the field in two
    let mut split = Grid::new(GridBounds::new(0, 7, 0, 5, -1), TerrainKind::Empty);
    for y in 0..5 {
        split.replace_tile(Cell::new(3, y), TerrainKind::Rock);
    }
    let unreachable = pathfinder.find_path(&split, Cell::new(0, 0), Cell::new(6, 4), true);
    results.push(TestResult {
        name: "pathfind_unreachable".into(),
        passed: unreachable.is_none(),
        detail: "disconnected halves → none".into(),
    });

    let outside = pathfinder.find_path(&split, Cell::new(0, 0), Cell::new(60, 0), true);
    results.push(TestResult {
        name: "pathfind_out_of_bounds".into(),
        passed: outside.is_none(),
        detail: "goal outside the grid → none".into(),
    });

    results
}

// ── 4. Colony run ───────────────────────────────────────────────────────

/// Queue a gallery east of the shaft and a shallower one west of it.
/// Rock and resource tiles along the way are skipped.
fn queue_dig_plan(engine: &mut ColonyEngine, config: &ColonyConfig) -> usize {
    let grid = &config.grid;
    let mut plan = Vec::new();
    let east_row = grid.entrance_row + grid.royal_room_depth / 2;
    for dx in 1..=12 {
        plan.push(Cell::new(grid.entrance_x + dx, east_row));
    }
    let west_row = grid.entrance_row + 2;
    for dx in 1..=8 {
        plan.push(Cell::new(grid.entrance_x - dx, west_row));
    }

    let mut queued = 0;
    for cell in plan {
        match engine.queue_dig(cell) {
            Ok(Some(_)) => queued += 1,
            Ok(None) => {}
            Err(e) => log::warn!("skipping dig at {:?}: {}", cell, e),
        }
    }
    queued
}

fn run_colony(
    config: &ColonyConfig,
    ticks: u64,
    verbose: bool,
) -> Result<(Vec<TestResult>, ColonyStats)> {
    log::info!("--- Colony Run ({} ticks) ---", ticks);
    let mut results = Vec::new();

    let mut engine = ColonyEngine::new(config.clone())?;
    let queued = queue_dig_plan(&mut engine, config);
    results.push(TestResult {
        name: "colony_dig_plan".into(),
        passed: queued > 0,
        detail: format!("{} digs queued", queued),
    });

    let mut bad_ticks = 0u64;
    let mut first_violation = None;
    let mut deaths = 0u64;
    let mut completions = 0u64;
    for tick in 0..ticks {
        engine.update(TICK_SECONDS);

        let violations = engine.invariant_violations();
        if !violations.is_empty() {
            bad_ticks += 1;
            if first_violation.is_none() {
                first_violation = Some(format!("tick {}: {}", tick, violations.join("; ")));
            }
        }

        for event in engine.drain_events() {
            match event {
                ColonyEvent::AgentDied { .. } => deaths += 1,
                ColonyEvent::TaskCompleted { .. } => completions += 1,
                ColonyEvent::DayPassed { day } if verbose => {
                    let stats = engine.stats();
                    log::info!(
                        "day {}: population {}, food {:.2}, tasks {}",
                        day,
                        stats.population.total(),
                        stats.food,
                        stats.tasks
                    );
                }
                _ => {}
            }
        }
    }

    results.push(TestResult {
        name: "colony_invariants".into(),
        passed: bad_ticks == 0,
        detail: first_violation.unwrap_or_else(|| format!("clean for all {} ticks", ticks)),
    });

    let stats = engine.stats();
    results.push(TestResult {
        name: "colony_event_ledger".into(),
        passed: deaths == stats.counters.deaths && completions == stats.counters.tasks_completed,
        detail: format!("{} deaths, {} completions reported", deaths, completions),
    });
    results.push(TestResult {
        name: "colony_population_ledger".into(),
        passed: engine.agent_count() as u32 == stats.population.total(),
        detail: format!("{} live agents", engine.agent_count()),
    });
    results.push(TestResult {
        name: "colony_food_non_negative".into(),
        passed: stats.food >= 0.0,
        detail: format!("food {:.2}", stats.food),
    });
    results.push(TestResult {
        name: "colony_path_cap".into(),
        passed: stats.path_overruns == 0,
        detail: format!("{} searches, {} overruns", stats.path_searches, stats.path_overruns),
    });

    Ok((results, stats))
}

// ── 5. Replay ───────────────────────────────────────────────────────────

fn replay_fingerprint(config: &ColonyConfig, ticks: u64) -> Result<String> {
    let mut engine = ColonyEngine::new(config.clone())?;
    queue_dig_plan(&mut engine, config);
    for _ in 0..ticks {
        engine.update(TICK_SECONDS);
    }
    let cells: Vec<(u32, Job, Cell, Option<TaskId>)> = engine
        .agent_views()
        .iter()
        .map(|v| (v.entity.id(), v.job, v.cell, v.task))
        .collect();
    Ok(format!(
        "{:?}|{}",
        cells,
        serde_json::to_string(&engine.stats())?
    ))
}

fn validate_replay(config: &ColonyConfig, ticks: u64, _verbose: bool) -> Result<Vec<TestResult>> {
    log::info!("--- Seeded Replay ({} ticks) ---", ticks);
    let first = replay_fingerprint(config, ticks)?;
    let second = replay_fingerprint(config, ticks)?;
    Ok(vec![TestResult {
        name: "replay_deterministic".into(),
        passed: first == second,
        detail: format!("seed {} replays identically", config.seed),
    }])
}
