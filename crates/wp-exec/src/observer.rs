//! Execution observer trait for tracing individual run events.

use wp_core::{AgentId, Pos, SimTime};

use crate::{AgentOutcome, CollisionStats};

/// Callbacks invoked by the executors as the run unfolds.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: Gantt-style occupancy log
///
/// ```rust,ignore
/// struct Occupancy(Vec<(AgentId, Pos, SimTime)>);
///
/// impl ExecObserver for Occupancy {
///     fn on_acquire(&mut self, agent: AgentId, cell: Pos, at: SimTime) {
///         self.0.push((agent, cell, at));
///     }
/// }
/// ```
pub trait ExecObserver {
    /// `agent` now holds `cell`.
    fn on_acquire(&mut self, _agent: AgentId, _cell: Pos, _at: SimTime) {}

    /// `agent` requested `cell` and has to wait for `holder`.
    fn on_blocked(&mut self, _agent: AgentId, _cell: Pos, _holder: AgentId, _at: SimTime) {}

    /// A wait that began with `on_blocked` ended at `at`: the cell was
    /// handed over, or the run stopped with `agent` still queued.
    fn on_collision(&mut self, _agent: AgentId, _cell: Pos, _wait: f64, _at: SimTime) {}

    /// A transient blockage started (`blocked = true`) or ended on `cell`.
    fn on_blockage(&mut self, _cell: Pos, _blocked: bool, _at: SimTime) {}

    /// `agent` found its next cell blocked and is replanning from `from`.
    fn on_replan(&mut self, _agent: AgentId, _from: Pos, _at: SimTime) {}

    /// `agent` reached a terminal state.
    fn on_agent_end(&mut self, _agent: AgentId, _outcome: AgentOutcome) {}

    /// Called once after the event loop stops.
    fn on_run_end(&mut self, _stats: &CollisionStats) {}
}

/// An [`ExecObserver`] that does nothing.
pub struct NoopObserver;

impl ExecObserver for NoopObserver {}
