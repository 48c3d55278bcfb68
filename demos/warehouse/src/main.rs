//! warehouse — end-to-end demo for the waypoint-tour workspace.
//!
//! Builds a small picking floor, solves the pick tour with every solver
//! family, splits the best tour across several pickers, executes their cell
//! paths with contention, and finally runs point-to-point orders under
//! random aisle blockages with replanning.
//!
//! Set `RUST_LOG=debug` to see per-solver and per-replan events.

mod layout;

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wp_core::{AgentId, Pos, SimTime};
use wp_exec::{
    ExecConfig, ExecObserver, Executor, Order, ReplanConfig, ReplanExecutor, theoretical_makespan,
};
use wp_grid::DistanceOracle;
use wp_tour::{
    AntColonyConfig, AntLionConfig, BaseAlgorithm, ExactConfig, GeneticConfig, HybridConfig,
    LocalSearchConfig, Solution, SolverConfig, TourShape, solve_with,
};

use layout::{DOCKS, PICKS, build_warehouse, waypoints};

// ── Constants ─────────────────────────────────────────────────────────────────

const PICKER_COUNT: usize = 3;
const SEED:         u64   = 42;
const STEP_TIME:    f64   = 0.2;

// ── Collision hot spots ───────────────────────────────────────────────────────

#[derive(Default)]
struct Hotspots(Vec<(Pos, f64)>);

impl ExecObserver for Hotspots {
    fn on_collision(&mut self, _agent: AgentId, cell: Pos, wait: f64, _at: SimTime) {
        match self.0.iter_mut().find(|(p, _)| *p == cell) {
            Some((_, total)) => *total += wait,
            None => self.0.push((cell, wait)),
        }
    }
}

fn solver_lineup() -> Vec<SolverConfig> {
    let budget = Some(Duration::from_millis(500));
    vec![
        SolverConfig::Exact(ExactConfig { time_limit: Some(Duration::from_secs(5)), ..ExactConfig::default() }),
        SolverConfig::Greedy,
        SolverConfig::LocalSearch(LocalSearchConfig::default()),
        SolverConfig::Genetic(GeneticConfig { seed: SEED, ..GeneticConfig::default() }),
        SolverConfig::AntColony(AntColonyConfig { seed: SEED, time_budget: budget, ..AntColonyConfig::default() }),
        SolverConfig::AntLion(AntLionConfig { seed: SEED, time_budget: budget, ..AntLionConfig::default() }),
        SolverConfig::Hybrid(HybridConfig::default()),
        SolverConfig::Hybrid(HybridConfig {
            base: BaseAlgorithm::AntColony(AntColonyConfig {
                seed: SEED,
                iterations: 20,
                ..AntColonyConfig::default()
            }),
            starting_point_count: 3,
            ..HybridConfig::default()
        }),
    ]
}

/// Split the visiting order (depot excluded) into `parts` contiguous runs,
/// each prefixed with the depot.
fn split_tour(order: &[usize], parts: usize) -> Vec<Vec<usize>> {
    let picks = &order[1..];
    let chunk = picks.len().div_ceil(parts.max(1)).max(1);
    picks
        .chunks(chunk)
        .map(|c| std::iter::once(order[0]).chain(c.iter().copied()).collect())
        .collect()
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== warehouse — waypoint tours and multi-agent execution ===");
    println!("Pickers: {PICKER_COUNT}  |  Picks: {}  |  Seed: {SEED}", PICKS.len());
    println!();

    // 1. Floor and distance oracle.
    let grid = build_warehouse()?;
    let oracle = DistanceOracle::new(&grid, waypoints())?;
    info!(
        event = "floor_ready",
        width = layout::WIDTH,
        height = layout::HEIGHT,
        obstacles = grid.obstacle_count(),
        waypoints = oracle.waypoints().len(),
    );

    // 2. Solve the closed pick tour with every family.
    println!("{:<14} {:>10} {:>8} {:>10} {:>7}", "Solver", "Length", "Iters", "Time (ms)", "Cut");
    println!("{}", "-".repeat(53));
    let mut best: Option<Solution> = None;
    for config in solver_lineup() {
        let sol = solve_with(&config, &oracle, 0, TourShape::Closed)?;
        println!(
            "{:<14} {:>10.1} {:>8} {:>10.2} {:>7}",
            config.name(),
            sol.length,
            sol.stats.iterations,
            sol.stats.elapsed.as_secs_f64() * 1e3,
            if sol.stats.budget_exhausted { "yes" } else { "no" },
        );
        if best.as_ref().is_none_or(|b| sol.length < b.length) {
            best = Some(sol);
        }
    }
    let Some(best) = best else { return Ok(()) };
    let (hits, misses) = oracle.cache_stats();
    println!();
    info!(event = "best_tour", algorithm = best.stats.algorithm, length = best.length, cache_hits = hits, cache_misses = misses);

    // 3. Split the best tour across pickers and execute the cell paths.
    let paths = split_tour(&best.order, PICKER_COUNT)
        .iter()
        .map(|order| oracle.expand_tour(order, true))
        .collect::<Result<Vec<_>, _>>()?;
    let executor = Executor::new(ExecConfig { step_time: STEP_TIME, cutoff: None })?;
    let mut hotspots = Hotspots::default();
    let t0 = Instant::now();
    let stats = executor.simulate_observed(&grid, &paths, &mut hotspots)?;
    let elapsed = t0.elapsed();

    println!("Fixed-path execution ({} pickers) in {:.3} ms", paths.len(), elapsed.as_secs_f64() * 1e3);
    println!("  makespan            : {:.1} (uncontended {:.1})", stats.makespan, theoretical_makespan(&paths, STEP_TIME));
    println!("  collisions          : {}", stats.total_collisions);
    println!("  total / max wait    : {:.1} / {:.1}", stats.total_wait_time, stats.max_wait_time);
    hotspots.0.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (cell, wait) in hotspots.0.iter().take(3) {
        println!("  hot spot {cell:<10} : {wait:.1} waited");
    }
    println!();

    // 4. Point-to-point orders with random blockages and replanning.
    let orders: Vec<Order> = DOCKS
        .iter()
        .zip(PICKS.iter().rev())
        .enumerate()
        .map(|(i, (&start, &goal))| Order { id: i as u32, start: start.into(), goal: goal.into() })
        .collect();
    let report = ReplanExecutor::new(ReplanConfig::default())?.run(&grid, &orders)?;

    println!("{:<6} {:>10} {:>8} {:>8} {:>8} {:<10}", "Order", "Exec time", "Waits", "Replans", "Success", "Outcome");
    println!("{}", "-".repeat(56));
    for o in &report.orders {
        println!(
            "{:<6} {:>10.1} {:>8.1} {:>8} {:>8} {:<10}",
            o.id,
            o.exec_time,
            o.waits,
            o.replan_count,
            if o.success { "yes" } else { "no" },
            format!("{:?}", o.outcome),
        );
    }
    println!();
    println!(
        "Success rate {:.0}%  |  replans {}  |  blockages {}",
        report.success_rate() * 100.0,
        report.total_replans(),
        report.blockages,
    );

    Ok(())
}
