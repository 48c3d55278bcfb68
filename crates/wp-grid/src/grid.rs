//! Obstacle grid representation and builder.
//!
//! # Data layout
//!
//! Obstacles are a dense row-major `Vec<bool>` indexed by
//! [`CellId`] = `y * width + x`, so `passable` is one bounds check plus one
//! load.  The same linear index is used by the routers' distance arrays and
//! by the executor's cell-resource pool.
//!
//! # Capability trait
//!
//! Routers and the executor only ever talk to a [`GridMap`]: the capability
//! object that scenario code supplies (`in_bounds`, `passable`, `neighbors`).
//! [`GridGraph`] is the stock implementation; [`BlockedView`] overlays a set
//! of transiently blocked cells on any other map for replanning.

use rustc_hash::FxHashSet;

use wp_core::{CellId, Pos};

use crate::{GridError, GridResult};

/// Axis-aligned neighbour offsets.
const STEPS_4: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Axis-aligned then diagonal neighbour offsets.
const STEPS_8: [(i32, i32); 8] = [
    (1, 0), (-1, 0), (0, 1), (0, -1),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

// ── GridMap ───────────────────────────────────────────────────────────────────

/// Read-only grid capability consumed by routers and executors.
///
/// # Invariant
///
/// A cell is passable iff it is in bounds and not an obstacle, and
/// [`neighbors`](Self::neighbors) never yields an impassable or out-of-bounds
/// cell.  Implementors only provide `passable`; the default `neighbors`
/// upholds the invariant by filtering through it.
pub trait GridMap: Sync {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    /// `true` for 8-connected adjacency, `false` for 4-connected.
    fn diagonal(&self) -> bool;

    /// `true` if `p` lies in bounds and is not blocked.
    fn passable(&self, p: Pos) -> bool;

    #[inline]
    fn in_bounds(&self, p: Pos) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width() && p.y < self.height()
    }

    /// Passable cells adjacent to `p`, axis-aligned moves first.
    fn neighbors(&self, p: Pos) -> impl Iterator<Item = Pos> + '_ {
        let steps: &'static [(i32, i32)] = if self.diagonal() { &STEPS_8 } else { &STEPS_4 };
        steps
            .iter()
            .map(move |&(dx, dy)| p.offset(dx, dy))
            .filter(move |&q| self.passable(q))
    }

    /// Number of cells (passable or not).
    #[inline]
    fn cell_count(&self) -> usize {
        (self.width().max(0) as usize) * (self.height().max(0) as usize)
    }

    /// Row-major linear index, or `None` when out of bounds.
    #[inline]
    fn cell_id(&self, p: Pos) -> Option<CellId> {
        self.in_bounds(p).then(|| CellId((p.y * self.width() + p.x) as u32))
    }

    /// Inverse of [`cell_id`](Self::cell_id).
    #[inline]
    fn pos_of(&self, cell: CellId) -> Pos {
        let w = self.width();
        Pos::new(cell.0 as i32 % w, cell.0 as i32 / w)
    }
}

// ── GridGraph ─────────────────────────────────────────────────────────────────

/// Rectangular obstacle grid with 4- or 8-connected adjacency.
///
/// Do not construct directly; use [`GridGraphBuilder`] or
/// [`GridGraph::empty`].
#[derive(Clone, Debug)]
pub struct GridGraph {
    width:    i32,
    height:   i32,
    diagonal: bool,
    /// `true` where the cell is an obstacle.  Indexed by `CellId`.
    blocked:  Vec<bool>,
}

impl GridGraph {
    /// An obstacle-free 4-connected grid.
    pub fn empty(width: i32, height: i32) -> GridResult<Self> {
        GridGraphBuilder::new(width, height).build()
    }

    /// Number of obstacle cells.
    pub fn obstacle_count(&self) -> usize {
        self.blocked.iter().filter(|&&b| b).count()
    }

    /// Obstacle positions in row-major order.
    pub fn obstacles(&self) -> impl Iterator<Item = Pos> + '_ {
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| self.pos_of(CellId(i as u32)))
    }

    /// Every passable cell in row-major order.
    pub fn free_cells(&self) -> Vec<Pos> {
        self.blocked
            .iter()
            .enumerate()
            .filter(|(_, b)| !**b)
            .map(|(i, _)| self.pos_of(CellId(i as u32)))
            .collect()
    }
}

impl GridMap for GridGraph {
    #[inline]
    fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn diagonal(&self) -> bool {
        self.diagonal
    }

    #[inline]
    fn passable(&self, p: Pos) -> bool {
        match self.cell_id(p) {
            Some(c) => !self.blocked[c.index()],
            None    => false,
        }
    }
}

// ── GridGraphBuilder ──────────────────────────────────────────────────────────

/// Construct a [`GridGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use wp_core::Pos;
/// use wp_grid::{GridGraphBuilder, GridMap};
///
/// let mut b = GridGraphBuilder::new(7, 7);
/// b.add_obstacle(Pos::new(3, 3));
/// b.add_rect_obstacle(0, 5, 2, 9); // clipped to the grid
/// let grid = b.build().unwrap();
/// assert!(!grid.passable(Pos::new(3, 3)));
/// assert_eq!(grid.obstacle_count(), 1 + 3 * 2);
/// ```
pub struct GridGraphBuilder {
    width:     i32,
    height:    i32,
    diagonal:  bool,
    obstacles: FxHashSet<Pos>,
}

impl GridGraphBuilder {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height, diagonal: false, obstacles: FxHashSet::default() }
    }

    /// Allow diagonal moves (8-connected).  Default: 4-connected.
    pub fn diagonal(mut self, allowed: bool) -> Self {
        self.diagonal = allowed;
        self
    }

    /// Mark one cell as an obstacle.  Out-of-bounds cells are ignored.
    pub fn add_obstacle(&mut self, p: Pos) {
        self.obstacles.insert(p);
    }

    /// Mark every cell of the inclusive rectangle `(x0, y0)..=(x1, y1)`,
    /// clipped to the grid.
    pub fn add_rect_obstacle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        for x in x0.max(0)..=x1.min(self.width - 1) {
            for y in y0.max(0)..=y1.min(self.height - 1) {
                self.obstacles.insert(Pos::new(x, y));
            }
        }
    }

    /// Consume the builder and produce a [`GridGraph`].
    pub fn build(self) -> GridResult<GridGraph> {
        if self.width <= 0 || self.height <= 0 {
            return Err(GridError::EmptyGrid { width: self.width, height: self.height });
        }
        let mut blocked = vec![false; (self.width * self.height) as usize];
        for p in self.obstacles {
            if p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height {
                blocked[(p.y * self.width + p.x) as usize] = true;
            }
        }
        Ok(GridGraph {
            width:    self.width,
            height:   self.height,
            diagonal: self.diagonal,
            blocked,
        })
    }
}

// ── BlockedView ───────────────────────────────────────────────────────────────

/// A grid seen through a set of additionally blocked cells.
///
/// Used by the replanning executor to route around transient blockages
/// without copying the underlying grid.
pub struct BlockedView<'a, G: GridMap> {
    grid:    &'a G,
    blocked: &'a FxHashSet<Pos>,
}

impl<'a, G: GridMap> BlockedView<'a, G> {
    pub fn new(grid: &'a G, blocked: &'a FxHashSet<Pos>) -> Self {
        Self { grid, blocked }
    }
}

impl<G: GridMap> GridMap for BlockedView<'_, G> {
    #[inline]
    fn width(&self) -> i32 {
        self.grid.width()
    }

    #[inline]
    fn height(&self) -> i32 {
        self.grid.height()
    }

    #[inline]
    fn diagonal(&self) -> bool {
        self.grid.diagonal()
    }

    #[inline]
    fn passable(&self, p: Pos) -> bool {
        self.grid.passable(p) && !self.blocked.contains(&p)
    }
}
