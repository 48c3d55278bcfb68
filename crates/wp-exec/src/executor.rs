//! Fixed-path executor.
//!
//! Each agent follows its cell sequence as a cooperative process:
//!
//! 1. request the first cell (waiting if it is held);
//! 2. for every further cell: travel for `step_time`, request the next
//!    cell (waiting if held), then release the previous one;
//! 3. release the last cell and finish.
//!
//! An agent keeps its current cell while it waits for the next one
//! (hold-and-wait, no multi-cell reservation), so two agents swapping
//! adjacent cells block each other forever.  The loop stops when the event
//! queue drains; agents still waiting at that point are reported as
//! [`AgentOutcome::Deadlocked`].

use tracing::{debug, info, trace};

use wp_core::error::check_positive;
use wp_core::{AgentId, CoreResult, Pos, SimTime};
use wp_grid::GridMap;

use crate::{
    Acquire, AgentOutcome, CellPool, CollisionStats, EventQueue, ExecError, ExecObserver, ExecResult,
    NoopObserver,
};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecConfig {
    /// Simulated time to travel between adjacent cells.
    pub step_time: f64,
    /// Stop at this simulated time; unfinished agents are `TimedOut`.
    pub cutoff:    Option<f64>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self { step_time: 0.2, cutoff: None }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> CoreResult<()> {
        check_positive("step_time", self.step_time)?;
        if let Some(c) = self.cutoff {
            check_positive("cutoff", c)?;
        }
        Ok(())
    }
}

// ── Executor ──────────────────────────────────────────────────────────────────

/// Simulates agents following precomputed cell paths.
#[derive(Clone, Debug, Default)]
pub struct Executor {
    config: ExecConfig,
}

impl Executor {
    pub fn new(config: ExecConfig) -> ExecResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Run every agent from time zero; `paths[i]` belongs to `AgentId(i)`.
    pub fn simulate<G: GridMap>(&self, grid: &G, paths: &[Vec<Pos>]) -> ExecResult<CollisionStats> {
        self.simulate_observed(grid, paths, &mut NoopObserver)
    }

    /// [`simulate`](Self::simulate) with observer callbacks.
    pub fn simulate_observed<G: GridMap, O: ExecObserver>(
        &self,
        grid:     &G,
        paths:    &[Vec<Pos>],
        observer: &mut O,
    ) -> ExecResult<CollisionStats> {
        if u32::try_from(paths.len()).is_err() {
            return Err(ExecError::TooManyAgents(paths.len()));
        }
        for (i, path) in paths.iter().enumerate() {
            check_path(grid, AgentId(i as u32), path)?;
        }

        let mut run = Run {
            paths,
            step:     self.config.step_time,
            pool:     CellPool::from_grid(grid),
            queue:    EventQueue::new(),
            cursor:   vec![0; paths.len()],
            since:    vec![None; paths.len()],
            stats:    CollisionStats::for_agents(paths.len()),
            observer,
        };
        debug!(event = "run_start", agents = paths.len(), cells = run.pool.len(), step_time = run.step);

        for (i, path) in paths.iter().enumerate() {
            if path.is_empty() {
                run.finish(i, SimTime::ZERO);
            } else {
                run.queue.push(SimTime::ZERO, Step::Start(i));
            }
        }

        let mut clock = SimTime::ZERO;
        let mut cut = false;
        while let Some(next) = run.queue.next_time() {
            if let Some(c) = self.config.cutoff.filter(|&c| next.as_f64() > c) {
                clock = SimTime(c);
                cut = true;
                break;
            }
            let Some((at, step)) = run.queue.pop() else { break };
            clock = at;
            match step {
                Step::Start(i)   => run.request(i, at)?,
                Step::Moved(i)   => {
                    run.cursor[i] += 1;
                    run.request(i, at)?;
                }
                Step::Granted(i) => run.acquired(i, at)?,
            }
        }

        run.settle_waits(clock);
        let Run { mut stats, observer, .. } = run;
        for (i, outcome) in stats.outcomes.iter_mut().enumerate() {
            if !outcome.is_finished() {
                *outcome = if cut { AgentOutcome::TimedOut } else { AgentOutcome::Deadlocked };
                observer.on_agent_end(AgentId(i as u32), *outcome);
            }
        }
        stats.makespan = clock.as_f64();
        info!(
            event = "run_end",
            agents = paths.len(),
            finished = stats.finished_count(),
            collisions = stats.total_collisions,
            total_wait = stats.total_wait_time,
            makespan = stats.makespan,
        );
        observer.on_run_end(&stats);
        Ok(stats)
    }
}

/// Convenience wrapper: validate `config` and run [`Executor::simulate`].
pub fn simulate<G: GridMap>(grid: &G, paths: &[Vec<Pos>], config: &ExecConfig) -> ExecResult<CollisionStats> {
    Executor::new(config.clone())?.simulate(grid, paths)
}

/// Makespan with no contention: the longest path's travel time.
pub fn theoretical_makespan(paths: &[Vec<Pos>], step_time: f64) -> f64 {
    paths
        .iter()
        .map(|p| p.len().saturating_sub(1) as f64 * step_time)
        .fold(0.0, f64::max)
}

/// Every step must be a free cell adjacent to the one before it.
pub(crate) fn check_path<G: GridMap>(grid: &G, agent: AgentId, path: &[Pos]) -> ExecResult<()> {
    for (index, &pos) in path.iter().enumerate() {
        if !grid.passable(pos) {
            return Err(ExecError::NotFree { agent, index, pos });
        }
    }
    for (index, w) in path.windows(2).enumerate() {
        if !grid.neighbors(w[0]).any(|n| n == w[1]) {
            return Err(ExecError::NotAdjacent { agent, index });
        }
    }
    Ok(())
}

// ── Event loop state ──────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug)]
enum Step {
    /// Request the first cell.
    Start(usize),
    /// Travel finished; request the next cell.
    Moved(usize),
    /// A release handed the requested cell to this waiting agent.
    Granted(usize),
}

struct Run<'a, O: ExecObserver> {
    paths:    &'a [Vec<Pos>],
    step:     f64,
    pool:     CellPool,
    queue:    EventQueue<Step>,
    /// Index into the agent's path of the cell it holds or is requesting.
    cursor:   Vec<usize>,
    /// When the agent started waiting, if it is waiting.
    since:    Vec<Option<SimTime>>,
    stats:    CollisionStats,
    observer: &'a mut O,
}

impl<O: ExecObserver> Run<'_, O> {
    fn request(&mut self, i: usize, at: SimTime) -> ExecResult<()> {
        let agent = AgentId(i as u32);
        let cell = self.paths[i][self.cursor[i]];
        match self.pool.request(cell, agent)? {
            Acquire::Granted => self.acquired(i, at),
            Acquire::Queued { holder } => {
                self.since[i] = Some(at);
                self.stats.record_block(cell);
                self.observer.on_blocked(agent, cell, holder, at);
                Ok(())
            }
        }
    }

    fn acquired(&mut self, i: usize, at: SimTime) -> ExecResult<()> {
        let agent = AgentId(i as u32);
        let paths = self.paths;
        let path = &paths[i];
        let k = self.cursor[i];
        let cell = path[k];

        self.end_wait(i, cell, at);
        self.observer.on_acquire(agent, cell, at);

        if k > 0 {
            self.release(path[k - 1], agent, at)?;
        }
        if k + 1 == path.len() {
            self.release(cell, agent, at)?;
            self.finish(i, at);
        } else {
            self.queue.push(at + self.step, Step::Moved(i));
        }
        Ok(())
    }

    /// Close agent `i`'s wait for `cell`, if it was queued.
    fn end_wait(&mut self, i: usize, cell: Pos, at: SimTime) {
        let Some(since) = self.since[i].take() else { return };
        let agent = AgentId(i as u32);
        let wait = at - since;
        self.stats.record_wait(agent, wait);
        trace!(event = "collision", agent = i, cell = %cell, wait, at = at.as_f64());
        self.observer.on_collision(agent, cell, wait, at);
    }

    /// The run stopped at `clock`: agents still queued waited until then.
    fn settle_waits(&mut self, clock: SimTime) {
        for i in 0..self.paths.len() {
            if self.since[i].is_some() {
                let cell = self.paths[i][self.cursor[i]];
                self.end_wait(i, cell, clock);
            }
        }
    }

    fn release(&mut self, cell: Pos, agent: AgentId, at: SimTime) -> ExecResult<()> {
        if let Some(next) = self.pool.release(cell, agent)? {
            self.queue.push(at, Step::Granted(next.index()));
        }
        Ok(())
    }

    fn finish(&mut self, i: usize, at: SimTime) {
        let outcome = AgentOutcome::Finished(at);
        self.stats.outcomes[i] = outcome;
        self.observer.on_agent_end(AgentId(i as u32), outcome);
    }
}
