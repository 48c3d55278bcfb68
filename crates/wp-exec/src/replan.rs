//! Point-to-point orders under transient cell blockages.
//!
//! Each order is a robot travelling from `start` to `goal` on a route
//! planned around the cells blocked at planning time.  Blockages come from
//! two sources: a seeded stochastic process that blocks a random free cell
//! at exponentially distributed intervals for an exponentially distributed
//! duration, and [`ForcedBlock`] injections at fixed instants.
//!
//! # Robot protocol
//!
//! While `Following`, a robot holding `route[k]`:
//!
//! 1. finishes (`Done`) if `route[k]` is the goal;
//! 2. enters `Blocked` if `route[k + 1]` is currently blocked;
//! 3. otherwise requests `route[k + 1]` (waiting if held), travels for
//!    `step_time`, then releases `route[k]`.
//!
//! Entering `Blocked` counts one replan and releases the held cell.  The
//! fallback is the first unblocked cell of the remaining stale route; with
//! none left the order is `Failed`.  A new route from the fallback to the
//! goal puts the robot back into `Following`; if the goal is cut off the
//! robot retries every `retry_interval`.  Orders still running at `cutoff`
//! are reported as unsuccessful with `exec_time = cutoff`.

use std::time::{Duration, Instant};

use rand_distr::{Distribution, Exp};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, trace};

use wp_core::error::check_positive;
use wp_core::{AgentId, CoreError, CoreResult, Pos, SimRng, SimTime};
use wp_grid::{AStarRouter, BlockedView, GridMap, Router};

use crate::{
    Acquire, AgentOutcome, CellPool, CollisionStats, EventQueue, ExecError, ExecObserver, ExecResult,
    NoopObserver,
};

// ── Inputs ────────────────────────────────────────────────────────────────────

/// One point-to-point delivery.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id:    u32,
    pub start: Pos,
    pub goal:  Pos,
}

/// Stochastic blockage process.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlockerConfig {
    pub enabled:       bool,
    /// Mean time between blockage attempts.
    pub mean_interval: f64,
    /// Mean blockage duration.
    pub mean_duration: f64,
    pub seed:          u64,
}

impl Default for BlockerConfig {
    fn default() -> Self {
        Self { enabled: true, mean_interval: 6.0, mean_duration: 3.0, seed: 42 }
    }
}

impl BlockerConfig {
    pub fn disabled() -> Self {
        Self { enabled: false, ..Self::default() }
    }

    pub fn validate(&self) -> CoreResult<()> {
        check_positive("mean_interval", self.mean_interval)?;
        check_positive("mean_duration", self.mean_duration)
    }
}

/// A deterministic blockage: `cell` is blocked during `[at, at + duration)`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForcedBlock {
    pub cell:     Pos,
    pub at:       f64,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReplanConfig {
    pub step_time:      f64,
    /// Simulated time at which unfinished orders are abandoned.
    pub cutoff:         f64,
    /// Delay before a robot with no route to its goal tries again.
    pub retry_interval: f64,
    pub blocker:        BlockerConfig,
}

impl Default for ReplanConfig {
    fn default() -> Self {
        Self {
            step_time:      1.0,
            cutoff:         1000.0,
            retry_interval: 1.0,
            blocker:        BlockerConfig::default(),
        }
    }
}

impl ReplanConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_positive("step_time", self.step_time)?;
        check_positive("cutoff", self.cutoff)?;
        check_positive("retry_interval", self.retry_interval)?;
        self.blocker.validate()
    }
}

// ── Outputs ───────────────────────────────────────────────────────────────────

/// Per-order key figures.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OrderReport {
    pub id:            u32,
    /// Simulated time from launch (t = 0) to completion, failure, or cutoff.
    pub exec_time:     f64,
    /// Sum of all cell waits, including one still pending when the run
    /// stopped.
    pub waits:         f64,
    pub replan_count:  usize,
    pub success:       bool,
    /// Wall-clock time spent in the router for this order.
    pub planning_time: Duration,
    pub outcome:       AgentOutcome,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReplanReport {
    /// One entry per order, in input order.
    pub orders:    Vec<OrderReport>,
    /// Contention figures over all robots; `AgentId(i)` is order `i`.
    pub stats:     CollisionStats,
    /// Stochastic blockages started during the run.
    pub blockages: usize,
}

impl ReplanReport {
    pub fn success_rate(&self) -> f64 {
        if self.orders.is_empty() {
            return 0.0;
        }
        self.orders.iter().filter(|o| o.success).count() as f64 / self.orders.len() as f64
    }

    pub fn total_replans(&self) -> usize {
        self.orders.iter().map(|o| o.replan_count).sum()
    }
}

// ── Executor ──────────────────────────────────────────────────────────────────

/// Runs orders with blockage-triggered replanning.
#[derive(Clone, Debug)]
pub struct ReplanExecutor<R: Router = AStarRouter> {
    config: ReplanConfig,
    router: R,
    forced: Vec<ForcedBlock>,
}

impl ReplanExecutor<AStarRouter> {
    pub fn new(config: ReplanConfig) -> ExecResult<Self> {
        Self::with_router(config, AStarRouter::default())
    }
}

impl<R: Router> ReplanExecutor<R> {
    pub fn with_router(config: ReplanConfig, router: R) -> ExecResult<Self> {
        config.validate()?;
        Ok(Self { config, router, forced: Vec::new() })
    }

    /// Schedule a deterministic blockage.
    pub fn force_block(mut self, block: ForcedBlock) -> ExecResult<Self> {
        if !(block.at.is_finite() && block.at >= 0.0) {
            return Err(CoreError::config("forced_block.at", format!("{} must be finite and >= 0", block.at)).into());
        }
        check_positive("forced_block.duration", block.duration)?;
        self.forced.push(block);
        Ok(self)
    }

    pub fn config(&self) -> &ReplanConfig {
        &self.config
    }

    pub fn run<G: GridMap>(&self, grid: &G, orders: &[Order]) -> ExecResult<ReplanReport> {
        self.run_observed(grid, orders, &mut NoopObserver)
    }

    pub fn run_observed<G: GridMap, O: ExecObserver>(
        &self,
        grid:     &G,
        orders:   &[Order],
        observer: &mut O,
    ) -> ExecResult<ReplanReport> {
        if u32::try_from(orders.len()).is_err() {
            return Err(ExecError::TooManyAgents(orders.len()));
        }
        for o in orders {
            for pos in [o.start, o.goal] {
                if !grid.passable(pos) {
                    return Err(ExecError::OrderEndpoint { order: o.id, pos });
                }
            }
        }
        let cfg = &self.config;
        let interval = Exp::new(1.0 / cfg.blocker.mean_interval)
            .map_err(|e| CoreError::config("mean_interval", e.to_string()))?;
        let duration = Exp::new(1.0 / cfg.blocker.mean_duration)
            .map_err(|e| CoreError::config("mean_duration", e.to_string()))?;

        let pool = CellPool::from_grid(grid);
        let mut free_cells: Vec<Pos> = Vec::with_capacity(pool.len());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p = Pos::new(x, y);
                if pool.contains(p) {
                    free_cells.push(p);
                }
            }
        }

        let mut sim = Sim {
            grid,
            router:   &self.router,
            cfg,
            pool,
            queue:    EventQueue::new(),
            robots:   orders.iter().map(Robot::new).collect(),
            counts:   FxHashMap::default(),
            blocked:  FxHashSet::default(),
            free_cells,
            rng:      SimRng::new(cfg.blocker.seed),
            interval,
            duration,
            stats:    CollisionStats::for_agents(orders.len()),
            blockages: 0,
            active:   orders.len(),
            observer,
        };
        debug!(event = "replan_run_start", orders = orders.len(), forced = self.forced.len());

        for i in 0..orders.len() {
            sim.queue.push(SimTime::ZERO, Event::Start(i));
        }
        for b in &self.forced {
            sim.queue.push(SimTime(b.at), Event::Block(b.cell));
            sim.queue.push(SimTime(b.at + b.duration), Event::Unblock(b.cell));
        }
        if cfg.blocker.enabled && !sim.free_cells.is_empty() {
            let first = sim.interval.sample(sim.rng.inner());
            sim.queue.push(SimTime(first), Event::BlockerTick);
        }

        let mut clock = SimTime::ZERO;
        while sim.active > 0 {
            let Some(next) = sim.queue.next_time() else { break };
            if next.as_f64() > cfg.cutoff {
                clock = SimTime(cfg.cutoff);
                break;
            }
            let Some((at, event)) = sim.queue.pop() else { break };
            clock = at;
            sim.handle(event, at)?;
        }

        sim.settle_waits(clock);
        let Sim { robots, mut stats, blockages, observer, .. } = sim;
        let cut = clock.as_f64() >= cfg.cutoff;
        let mut reports = Vec::with_capacity(robots.len());
        for (i, mut robot) in robots.into_iter().enumerate() {
            if let Phase::Following | Phase::Blocked = robot.phase {
                let outcome = if cut { AgentOutcome::TimedOut } else { AgentOutcome::Deadlocked };
                robot.report.outcome = outcome;
                robot.report.exec_time = clock.as_f64();
                observer.on_agent_end(AgentId(i as u32), outcome);
            }
            stats.outcomes[i] = robot.report.outcome;
            reports.push(robot.report);
        }
        stats.makespan = clock.as_f64();

        let report = ReplanReport { orders: reports, stats, blockages };
        info!(
            event = "replan_run_end",
            orders = orders.len(),
            success_rate = report.success_rate(),
            replans = report.total_replans(),
            collisions = report.stats.total_collisions,
            blockages,
            makespan = report.stats.makespan,
        );
        observer.on_run_end(&report.stats);
        Ok(report)
    }
}

// ── Event loop state ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum Event {
    /// Plan and launch order `i`.
    Start(usize),
    /// A release handed the requested cell to robot `i`.
    Granted(usize),
    /// Robot `i` finished travelling into its requested cell.
    Moved(usize),
    /// Robot `i` had no route; try again.
    Retry(usize),
    BlockerTick,
    Block(Pos),
    Unblock(Pos),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Following,
    Blocked,
    Done,
    Failed,
}

struct Robot {
    goal:   Pos,
    route:  Vec<Pos>,
    /// Index of the cell being requested, or held once travel completes.
    cursor: usize,
    /// Cell the robot occupies; `None` between routes.
    held:   Option<Pos>,
    since:  Option<SimTime>,
    phase:  Phase,
    report: OrderReport,
}

impl Robot {
    fn new(order: &Order) -> Self {
        Self {
            goal:   order.goal,
            route:  vec![order.start],
            cursor: 0,
            held:   None,
            since:  None,
            phase:  Phase::Blocked,
            report: OrderReport {
                id:            order.id,
                exec_time:     0.0,
                waits:         0.0,
                replan_count:  0,
                success:       false,
                planning_time: Duration::ZERO,
                outcome:       AgentOutcome::Deadlocked,
            },
        }
    }
}

struct Sim<'a, G: GridMap, R: Router, O: ExecObserver> {
    grid:       &'a G,
    router:     &'a R,
    cfg:        &'a ReplanConfig,
    pool:       CellPool,
    queue:      EventQueue<Event>,
    robots:     Vec<Robot>,
    /// Active blockages per cell; forced and stochastic blocks may overlap.
    counts:     FxHashMap<Pos, u32>,
    blocked:    FxHashSet<Pos>,
    free_cells: Vec<Pos>,
    rng:        SimRng,
    interval:   Exp<f64>,
    duration:   Exp<f64>,
    stats:      CollisionStats,
    blockages:  usize,
    /// Robots not yet `Done` or `Failed`.
    active:     usize,
    observer:   &'a mut O,
}

impl<G: GridMap, R: Router, O: ExecObserver> Sim<'_, G, R, O> {
    fn handle(&mut self, event: Event, at: SimTime) -> ExecResult<()> {
        match event {
            Event::Start(i) => self.replan(i, at),
            Event::Retry(i) => {
                if self.robots[i].phase == Phase::Blocked {
                    self.replan(i, at)?;
                }
                Ok(())
            }
            Event::Granted(i) => self.acquired(i, at),
            Event::Moved(i) => {
                let robot = &mut self.robots[i];
                let entered = robot.route[robot.cursor];
                if let Some(prev) = robot.held.replace(entered) {
                    self.release(prev, i, at)?;
                }
                self.advance(i, at)
            }
            Event::BlockerTick => {
                if let Some(cell) = self.random_free_cell() {
                    if !self.blocked.contains(&cell) {
                        self.block(cell, at);
                        self.blockages += 1;
                        let d = self.duration.sample(self.rng.inner());
                        self.queue.push(at + d, Event::Unblock(cell));
                    }
                }
                let gap = self.interval.sample(self.rng.inner());
                self.queue.push(at + gap, Event::BlockerTick);
                Ok(())
            }
            Event::Block(cell) => {
                self.block(cell, at);
                Ok(())
            }
            Event::Unblock(cell) => {
                self.unblock(cell, at);
                Ok(())
            }
        }
    }

    fn random_free_cell(&mut self) -> Option<Pos> {
        if self.free_cells.is_empty() {
            return None;
        }
        let k = self.rng.gen_range(0..self.free_cells.len());
        self.free_cells.get(k).copied()
    }

    fn block(&mut self, cell: Pos, at: SimTime) {
        let n = self.counts.entry(cell).or_insert(0);
        *n += 1;
        if *n == 1 {
            self.blocked.insert(cell);
            trace!(event = "block", cell = %cell, at = at.as_f64());
            self.observer.on_blockage(cell, true, at);
        }
    }

    fn unblock(&mut self, cell: Pos, at: SimTime) {
        let Some(n) = self.counts.get_mut(&cell) else { return };
        *n -= 1;
        if *n == 0 {
            self.counts.remove(&cell);
            self.blocked.remove(&cell);
            trace!(event = "unblock", cell = %cell, at = at.as_f64());
            self.observer.on_blockage(cell, false, at);
        }
    }

    /// Robot `i` is `Blocked`: find a fallback on its stale route and plan
    /// from there, or give up.
    ///
    /// Only `route[cursor..]` is scanned, never cells already left behind,
    /// so a robot cannot jump back along its route.
    fn replan(&mut self, i: usize, at: SimTime) -> ExecResult<()> {
        let robot = &self.robots[i];
        let fallback = robot.route[robot.cursor..].iter().copied().find(|c| !self.blocked.contains(c));
        let Some(from) = fallback else {
            self.end(i, at, AgentOutcome::Failed);
            return Ok(());
        };

        let timer = Instant::now();
        let view = BlockedView::new(self.grid, &self.blocked);
        let route = self.router.route(&view, from, robot.goal)?;
        let robot = &mut self.robots[i];
        robot.report.planning_time += timer.elapsed();

        if !route.is_reachable() {
            self.queue.push(at + self.cfg.retry_interval, Event::Retry(i));
            return Ok(());
        }
        robot.route = route.cells;
        robot.cursor = 0;
        robot.phase = Phase::Following;
        let first = robot.route[0];
        self.request(i, first, at)
    }

    fn request(&mut self, i: usize, cell: Pos, at: SimTime) -> ExecResult<()> {
        let agent = AgentId(i as u32);
        match self.pool.request(cell, agent)? {
            Acquire::Granted => self.acquired(i, at),
            Acquire::Queued { holder } => {
                self.robots[i].since = Some(at);
                self.stats.record_block(cell);
                self.observer.on_blocked(agent, cell, holder, at);
                Ok(())
            }
        }
    }

    fn acquired(&mut self, i: usize, at: SimTime) -> ExecResult<()> {
        let agent = AgentId(i as u32);
        let cell = self.robots[i].route[self.robots[i].cursor];
        self.end_wait(i, cell, at);
        self.observer.on_acquire(agent, cell, at);
        let robot = &mut self.robots[i];

        if robot.held.is_none() {
            // First cell of a route: no travel needed.
            robot.held = Some(cell);
            self.advance(i, at)
        } else {
            self.queue.push(at + self.cfg.step_time, Event::Moved(i));
            Ok(())
        }
    }

    /// Close robot `i`'s wait for `cell`, if it was queued.
    fn end_wait(&mut self, i: usize, cell: Pos, at: SimTime) {
        let robot = &mut self.robots[i];
        let Some(since) = robot.since.take() else { return };
        let wait = at - since;
        robot.report.waits += wait;
        self.stats.record_wait(AgentId(i as u32), wait);
        trace!(event = "collision", agent = i, cell = %cell, wait, at = at.as_f64());
        self.observer.on_collision(AgentId(i as u32), cell, wait, at);
    }

    /// The run stopped at `clock`: robots still queued waited until then.
    fn settle_waits(&mut self, clock: SimTime) {
        for i in 0..self.robots.len() {
            if self.robots[i].since.is_some() {
                let cell = self.robots[i].route[self.robots[i].cursor];
                self.end_wait(i, cell, clock);
            }
        }
    }

    /// Robot `i` holds `route[cursor]`; decide its next step.
    fn advance(&mut self, i: usize, at: SimTime) -> ExecResult<()> {
        let robot = &mut self.robots[i];
        if robot.cursor + 1 == robot.route.len() {
            if let Some(cell) = robot.held.take() {
                self.release(cell, i, at)?;
            }
            self.end(i, at, AgentOutcome::Finished(at));
            return Ok(());
        }

        let next = robot.route[robot.cursor + 1];
        if self.blocked.contains(&next) {
            robot.phase = Phase::Blocked;
            robot.report.replan_count += 1;
            let held = robot.held.take();
            let replans = robot.report.replan_count;
            debug!(event = "replan", order = robot.report.id, at = at.as_f64(), blocked = %next, replans);
            if let Some(cell) = held {
                self.observer.on_replan(AgentId(i as u32), cell, at);
                self.release(cell, i, at)?;
            }
            return self.replan(i, at);
        }

        robot.cursor += 1;
        self.request(i, next, at)
    }

    fn release(&mut self, cell: Pos, i: usize, at: SimTime) -> ExecResult<()> {
        if let Some(next) = self.pool.release(cell, AgentId(i as u32))? {
            self.queue.push(at, Event::Granted(next.index()));
        }
        Ok(())
    }

    fn end(&mut self, i: usize, at: SimTime, outcome: AgentOutcome) {
        let robot = &mut self.robots[i];
        robot.phase = match outcome {
            AgentOutcome::Finished(_) => Phase::Done,
            _                         => Phase::Failed,
        };
        robot.report.success = outcome.is_finished();
        robot.report.exec_time = at.as_f64();
        robot.report.outcome = outcome;
        self.active -= 1;
        self.observer.on_agent_end(AgentId(i as u32), outcome);
    }
}
