//! Contention statistics collected during a run.

use wp_core::{AgentId, Pos, SimTime};

/// How an agent's run ended.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AgentOutcome {
    /// Released its last cell at this instant.
    Finished(SimTime),
    /// Still waiting on a cell when no further event could ever free it.
    Deadlocked,
    /// Not done when the simulation cutoff was reached.
    TimedOut,
    /// Gave up: every remaining cell of its route was blocked.
    Failed,
}

impl AgentOutcome {
    pub fn is_finished(self) -> bool {
        matches!(self, AgentOutcome::Finished(_))
    }
}

/// Snapshot of a finished run.
///
/// A *collision* is one request that found its cell held and had to queue.
/// Every collision is counted when it happens, whether or not the wait ever
/// ends; a wait still pending when the run stops lasts until `makespan`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CollisionStats {
    pub total_collisions:    usize,
    pub total_wait_time:     f64,
    pub max_wait_time:       f64,
    /// Duration of every collision, in the order the waits ended.
    pub wait_events:         Vec<f64>,
    /// Cell of every collision, in the order they happened.
    pub collision_locations: Vec<Pos>,
    /// Total wait per agent, indexed by `AgentId`.
    pub agent_wait_times:    Vec<f64>,
    /// Per-agent outcome, indexed by `AgentId`.
    pub outcomes:            Vec<AgentOutcome>,
    /// Simulated time when the run stopped: the last finish, the instant
    /// the event queue drained, or the cutoff.
    pub makespan:            f64,
}

impl CollisionStats {
    pub(crate) fn for_agents(n: usize) -> Self {
        Self {
            agent_wait_times: vec![0.0; n],
            outcomes:         vec![AgentOutcome::Deadlocked; n],
            ..Self::default()
        }
    }

    /// Count one request for `cell` that had to queue.
    pub(crate) fn record_block(&mut self, cell: Pos) {
        self.total_collisions += 1;
        self.collision_locations.push(cell);
    }

    /// Account a wait by `agent` that ended after `wait`, either on
    /// acquisition or because the run stopped.
    pub(crate) fn record_wait(&mut self, agent: AgentId, wait: f64) {
        self.total_wait_time += wait;
        self.max_wait_time = self.max_wait_time.max(wait);
        self.wait_events.push(wait);
        if let Some(w) = self.agent_wait_times.get_mut(agent.index()) {
            *w += wait;
        }
    }

    pub fn agent_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn finished_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_finished()).count()
    }

    pub fn all_finished(&self) -> bool {
        self.outcomes.iter().all(|o| o.is_finished())
    }

    /// Mean collision duration; `0` when there were none.
    pub fn mean_wait(&self) -> f64 {
        if self.total_collisions == 0 {
            0.0
        } else {
            self.total_wait_time / self.total_collisions as f64
        }
    }
}
