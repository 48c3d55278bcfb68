//! Capacity-one cell resources.
//!
//! Every free cell of the grid is a mutual-exclusion token.  A request on a
//! held cell joins that cell's FIFO waiter list; releasing the cell hands it
//! straight to the first waiter, so no third agent can slip in between.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use wp_core::{AgentId, Pos};
use wp_grid::GridMap;

use crate::{ExecError, ExecResult};

/// Outcome of [`CellPool::request`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Acquire {
    /// The requester now holds the cell.
    Granted,
    /// The cell is held; the requester is queued behind `holder`.
    Queued { holder: AgentId },
}

/// One cell's occupant and queue.
#[derive(Clone, Debug, Default)]
pub struct CellResource {
    holder:  Option<AgentId>,
    waiters: VecDeque<AgentId>,
}

impl CellResource {
    pub fn holder(&self) -> Option<AgentId> {
        self.holder
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}

/// All cell resources of one run.
#[derive(Clone, Debug, Default)]
pub struct CellPool {
    cells: FxHashMap<Pos, CellResource>,
}

impl CellPool {
    /// One resource per passable cell of `grid`.
    pub fn from_grid<G: GridMap>(grid: &G) -> Self {
        let mut cells = FxHashMap::default();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let p = Pos::new(x, y);
                if grid.passable(p) {
                    cells.insert(p, CellResource::default());
                }
            }
        }
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: Pos) -> bool {
        self.cells.contains_key(&cell)
    }

    pub fn get(&self, cell: Pos) -> Option<&CellResource> {
        self.cells.get(&cell)
    }

    pub fn holder(&self, cell: Pos) -> Option<AgentId> {
        self.cells.get(&cell).and_then(CellResource::holder)
    }

    /// Cells currently held by some agent.
    pub fn occupied(&self) -> usize {
        self.cells.values().filter(|c| c.holder.is_some()).count()
    }

    /// Take `cell` if free, otherwise join its queue.
    pub fn request(&mut self, cell: Pos, agent: AgentId) -> ExecResult<Acquire> {
        let res = self.cells.get_mut(&cell).ok_or(ExecError::UnknownCell(cell))?;
        match res.holder {
            None => {
                res.holder = Some(agent);
                Ok(Acquire::Granted)
            }
            Some(holder) => {
                res.waiters.push_back(agent);
                Ok(Acquire::Queued { holder })
            }
        }
    }

    /// Give up `cell`.  Returns the waiter that now holds it, if any.
    pub fn release(&mut self, cell: Pos, agent: AgentId) -> ExecResult<Option<AgentId>> {
        let res = self.cells.get_mut(&cell).ok_or(ExecError::UnknownCell(cell))?;
        if res.holder != Some(agent) {
            return Err(ExecError::NotHolder { cell, agent });
        }
        res.holder = res.waiters.pop_front();
        Ok(res.holder)
    }
}
