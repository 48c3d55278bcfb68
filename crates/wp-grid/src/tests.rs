//! Unit tests for wp-grid.
//!
//! All grids are built by hand; nothing is loaded from disk.

#[cfg(test)]
mod helpers {
    use wp_core::Pos;

    use crate::{GridGraph, GridGraphBuilder};

    /// 7×7 grid with a small wall near the origin and two diagonal blockers.
    ///
    /// ```text
    ///   y\x 0 1 2 3 4 5 6
    ///   0   . . . . . . .
    ///   1   . # # . . . .
    ///   2   . # . . . . .
    ///   3   . . . # . . .
    ///   4   . . . . # . .
    ///   5   . . . . . . .
    ///   6   . . . . . . .
    /// ```
    pub fn seven_by_seven(diagonal: bool) -> GridGraph {
        let mut b = GridGraphBuilder::new(7, 7).diagonal(diagonal);
        for (x, y) in [(1, 1), (1, 2), (2, 1), (3, 3), (4, 4)] {
            b.add_obstacle(Pos::new(x, y));
        }
        b.build().unwrap()
    }

    /// 5×5 grid split by a full vertical wall at x = 2.
    pub fn walled(diagonal: bool) -> GridGraph {
        let mut b = GridGraphBuilder::new(5, 5).diagonal(diagonal);
        b.add_rect_obstacle(2, 0, 2, 4);
        b.build().unwrap()
    }

    /// Every consecutive pair of `cells` is a legal single move on `grid`.
    pub fn assert_contiguous(grid: &impl crate::GridMap, cells: &[Pos]) {
        for w in cells.windows(2) {
            let dx = (w[0].x - w[1].x).abs();
            let dy = (w[0].y - w[1].y).abs();
            assert!(dx <= 1 && dy <= 1 && dx + dy > 0, "{} -> {} is not one move", w[0], w[1]);
            if !grid.diagonal() {
                assert!(dx + dy == 1, "diagonal move {} -> {} on 4-connected grid", w[0], w[1]);
            }
            assert!(grid.passable(w[1]), "path enters blocked cell {}", w[1]);
        }
    }
}

// ── Grid structure ────────────────────────────────────────────────────────────

#[cfg(test)]
mod grid {
    use rustc_hash::FxHashSet;
    use wp_core::{CellId, Pos};

    use crate::{BlockedView, GridError, GridGraph, GridGraphBuilder, GridMap};

    #[test]
    fn empty_dimensions_rejected() {
        assert!(matches!(GridGraph::empty(0, 3), Err(GridError::EmptyGrid { .. })));
        assert!(matches!(GridGraphBuilder::new(3, -1).build(), Err(GridError::EmptyGrid { .. })));
    }

    #[test]
    fn passable_checks_bounds_and_obstacles() {
        let g = super::helpers::seven_by_seven(false);
        assert!(g.passable(Pos::new(0, 0)));
        assert!(!g.passable(Pos::new(1, 1)));
        assert!(!g.passable(Pos::new(-1, 0)));
        assert!(!g.passable(Pos::new(7, 0)));
        assert_eq!(g.obstacle_count(), 5);
        assert_eq!(g.free_cells().len(), 49 - 5);
    }

    #[test]
    fn cell_id_roundtrip() {
        let g = GridGraph::empty(4, 3).unwrap();
        let p = Pos::new(3, 2);
        let id = g.cell_id(p).unwrap();
        assert_eq!(id, CellId(2 * 4 + 3));
        assert_eq!(g.pos_of(id), p);
        assert_eq!(g.cell_id(Pos::new(4, 0)), None);
    }

    #[test]
    fn neighbors_four_connected() {
        let g = GridGraph::empty(3, 3).unwrap();
        let mut n: Vec<_> = g.neighbors(Pos::new(1, 1)).collect();
        n.sort();
        assert_eq!(n, vec![Pos::new(0, 1), Pos::new(1, 0), Pos::new(1, 2), Pos::new(2, 1)]);
        // Corner has two.
        assert_eq!(g.neighbors(Pos::new(0, 0)).count(), 2);
    }

    #[test]
    fn neighbors_eight_connected_skip_obstacles() {
        let g = super::helpers::seven_by_seven(true);
        // (0,0): right (1,0), down (0,1), diagonal (1,1) is blocked.
        let n: FxHashSet<_> = g.neighbors(Pos::new(0, 0)).collect();
        assert_eq!(n.len(), 2);
        assert!(!n.contains(&Pos::new(1, 1)));
        // Interior free cell sees all eight minus blocked ones.
        assert_eq!(g.neighbors(Pos::new(5, 5)).count(), 7); // (4,4) blocked
    }

    #[test]
    fn blocked_view_overlays_cells() {
        let g = GridGraph::empty(3, 1).unwrap();
        let mut extra = FxHashSet::default();
        extra.insert(Pos::new(1, 0));
        let view = BlockedView::new(&g, &extra);
        assert!(view.passable(Pos::new(0, 0)));
        assert!(!view.passable(Pos::new(1, 0)));
        assert_eq!(view.neighbors(Pos::new(0, 0)).count(), 0);
        // Underlying grid is untouched.
        assert!(g.passable(Pos::new(1, 0)));
    }
}

// ── Routing ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod routing {
    use std::f64::consts::SQRT_2;

    use rustc_hash::FxHashSet;
    use wp_core::{Pos, SolverRng};

    use crate::{AStarRouter, BlockedView, DijkstraRouter, GridError, GridGraph, GridMap, Heuristic, Router};

    #[test]
    fn astar_matches_dijkstra_on_reference_grid() {
        let g = super::helpers::seven_by_seven(false);
        let (a, b) = (Pos::new(0, 0), Pos::new(6, 6));
        let astar = AStarRouter::default().route(&g, a, b).unwrap();
        let dijk = DijkstraRouter.route(&g, a, b).unwrap();
        assert_eq!(astar.cost, 12.0);
        assert_eq!(dijk.cost, astar.cost);
        assert_eq!(astar.cells.first(), Some(&a));
        assert_eq!(astar.cells.last(), Some(&b));
        assert_eq!(astar.moves(), 12);
        super::helpers::assert_contiguous(&g, &astar.cells);
    }

    #[test]
    fn astar_expands_no_more_than_dijkstra() {
        let g = super::helpers::seven_by_seven(false);
        let (a, b) = (Pos::new(0, 0), Pos::new(6, 6));
        let astar = AStarRouter::default().route(&g, a, b).unwrap();
        let dijk = DijkstraRouter.route(&g, a, b).unwrap();
        assert!(astar.nodes_expanded <= dijk.nodes_expanded);
        assert!(astar.nodes_expanded > 0);
    }

    #[test]
    fn astar_matches_dijkstra_on_random_pairs() {
        for diagonal in [false, true] {
            let g = super::helpers::seven_by_seven(diagonal);
            let free = g.free_cells();
            let mut rng = SolverRng::new(7);
            for _ in 0..200 {
                let a = *rng.choose(&free).unwrap();
                let b = *rng.choose(&free).unwrap();
                let astar = AStarRouter::default().route(&g, a, b).unwrap();
                let dijk = DijkstraRouter.route(&g, a, b).unwrap();
                assert!(
                    (astar.cost - dijk.cost).abs() < 1e-9,
                    "{a} -> {b} (diagonal={diagonal}): A* {} vs Dijkstra {}",
                    astar.cost,
                    dijk.cost,
                );
                super::helpers::assert_contiguous(&g, &astar.cells);
            }
        }
    }

    #[test]
    fn diagonal_costs_sqrt_two() {
        let g = GridGraph::empty(4, 4).unwrap();
        let g8 = {
            let b = crate::GridGraphBuilder::new(4, 4).diagonal(true);
            b.build().unwrap()
        };
        let straight = AStarRouter::default().route(&g, Pos::new(0, 0), Pos::new(3, 3)).unwrap();
        let diag = AStarRouter::default().route(&g8, Pos::new(0, 0), Pos::new(3, 3)).unwrap();
        assert_eq!(straight.cost, 6.0);
        assert!((diag.cost - 3.0 * SQRT_2).abs() < 1e-12);
        assert_eq!(diag.moves(), 3);
    }

    #[test]
    fn path_cost_equals_sum_of_steps() {
        let g = super::helpers::seven_by_seven(true);
        let r = AStarRouter::default().route(&g, Pos::new(0, 6), Pos::new(6, 0)).unwrap();
        let summed: f64 = r.cells.windows(2).map(|w| w[0].step_cost_to(w[1])).sum();
        assert!((summed - r.cost).abs() < 1e-9);
    }

    #[test]
    fn same_cell_is_trivial() {
        let g = GridGraph::empty(3, 3).unwrap();
        let r = AStarRouter::default().route(&g, Pos::new(1, 1), Pos::new(1, 1)).unwrap();
        assert_eq!(r.cells, vec![Pos::new(1, 1)]);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn wall_makes_goal_unreachable() {
        let g = super::helpers::walled(true);
        let r = AStarRouter::default().route(&g, Pos::new(0, 0), Pos::new(4, 4)).unwrap();
        assert!(!r.is_reachable());
        assert!(r.cells.is_empty());
        assert_eq!(r.cost, f64::INFINITY);
        // The whole left component (2 columns × 5 rows) was explored.
        assert_eq!(r.nodes_expanded, 10);
    }

    #[test]
    fn blocked_endpoint_is_unreachable_not_error() {
        let g = super::helpers::seven_by_seven(false);
        let r = DijkstraRouter.route(&g, Pos::new(0, 0), Pos::new(1, 1)).unwrap();
        assert!(!r.is_reachable());
    }

    #[test]
    fn out_of_bounds_is_error() {
        let g = GridGraph::empty(3, 3).unwrap();
        let err = AStarRouter::default().route(&g, Pos::new(0, 0), Pos::new(3, 0));
        assert!(matches!(err, Err(GridError::OutOfBounds(p)) if p == Pos::new(3, 0)));
    }

    #[test]
    fn routes_around_blocked_view() {
        let g = GridGraph::empty(3, 3).unwrap();
        let mut extra = FxHashSet::default();
        extra.insert(Pos::new(1, 0));
        extra.insert(Pos::new(1, 1));
        let view = BlockedView::new(&g, &extra);
        let r = AStarRouter::default().route(&view, Pos::new(0, 0), Pos::new(2, 0)).unwrap();
        assert_eq!(r.cost, 6.0);
        assert!(r.cells.iter().all(|p| view.passable(*p)));
    }

    #[test]
    fn explicit_octile_heuristic_is_optimal() {
        // Explicit heuristics are honoured; octile stays optimal on 8-grids.
        let g = super::helpers::seven_by_seven(true);
        let octile = AStarRouter::with_heuristic(Heuristic::Octile)
            .route(&g, Pos::new(0, 0), Pos::new(6, 6))
            .unwrap();
        let dijk = DijkstraRouter.route(&g, Pos::new(0, 0), Pos::new(6, 6)).unwrap();
        assert!((octile.cost - dijk.cost).abs() < 1e-9);
    }
}

// ── Distance oracle ───────────────────────────────────────────────────────────

#[cfg(test)]
mod oracle {
    use wp_core::{Distances, Pos};

    use crate::{DistanceOracle, GridError, GridGraph, distance_function};

    fn waypoints() -> Vec<Pos> {
        vec![Pos::new(0, 0), Pos::new(6, 6), Pos::new(0, 6), Pos::new(6, 0), Pos::new(3, 0)]
    }

    #[test]
    fn symmetric_with_zero_diagonal() {
        let g = super::helpers::seven_by_seven(true);
        let o = DistanceOracle::new(&g, waypoints()).unwrap();
        for i in 0..o.len() {
            assert_eq!(o.distance(i, i), 0.0);
            for j in 0..o.len() {
                assert_eq!(o.distance(i, j), o.distance(j, i), "d({i},{j}) != d({j},{i})");
            }
        }
        assert!(o.matrix().is_symmetric());
    }

    #[test]
    fn each_pair_routed_once() {
        let g = super::helpers::seven_by_seven(false);
        let o = DistanceOracle::new(&g, waypoints()).unwrap();
        let _ = o.distance(0, 1);
        let _ = o.distance(1, 0);
        let _ = o.distance(0, 1);
        assert_eq!(o.cache_len(), 1);
        assert_eq!(o.cache_stats(), (2, 1));

        let _ = o.matrix();
        assert_eq!(o.cache_len(), 5 * 4 / 2);

        o.clear_cache();
        assert_eq!(o.cache_len(), 0);
        assert_eq!(o.cache_stats(), (0, 0));
    }

    #[test]
    fn reverse_path_is_reversed_forward_path() {
        let g = super::helpers::seven_by_seven(false);
        let o = DistanceOracle::new(&g, waypoints()).unwrap();
        let fwd = o.path(0, 1).unwrap();
        let mut back = o.path(1, 0).unwrap();
        back.reverse();
        assert_eq!(fwd, back);
        assert_eq!(fwd.first(), Some(&Pos::new(0, 0)));
        assert_eq!(o.path(2, 2).unwrap(), vec![Pos::new(0, 6)]);
    }

    #[test]
    fn unreachable_pair_is_infinite() {
        let g = super::helpers::walled(false);
        let o = DistanceOracle::new(&g, vec![Pos::new(0, 0), Pos::new(4, 0)]).unwrap();
        assert_eq!(o.distance(0, 1), f64::INFINITY);
        assert!(o.path(0, 1).unwrap().is_empty());
        assert!(matches!(o.expand_tour(&[0, 1], false), Err(GridError::UnreachableLeg { from: 0, to: 1 })));
    }

    #[test]
    fn out_of_bounds_waypoint_rejected() {
        let g = GridGraph::empty(3, 3).unwrap();
        assert!(matches!(
            DistanceOracle::new(&g, vec![Pos::new(0, 0), Pos::new(0, 9)]),
            Err(GridError::OutOfBounds(_))
        ));
    }

    #[test]
    fn bad_index_reports_error_and_infinity() {
        let g = GridGraph::empty(3, 3).unwrap();
        let o = DistanceOracle::new(&g, vec![Pos::new(0, 0)]).unwrap();
        assert!(matches!(o.try_distance(0, 4), Err(GridError::WaypointIndex { index: 4, len: 1 })));
        assert_eq!(o.distance(0, 4), f64::INFINITY);
    }

    #[test]
    fn expand_tour_shares_junctions() {
        let g = GridGraph::empty(5, 1).unwrap();
        let wps = vec![Pos::new(0, 0), Pos::new(2, 0), Pos::new(4, 0)];
        let o = DistanceOracle::new(&g, wps).unwrap();
        let open = o.expand_tour(&[0, 1, 2], false).unwrap();
        assert_eq!(open, (0..5).map(|x| Pos::new(x, 0)).collect::<Vec<_>>());

        let closed = o.expand_tour(&[0, 1, 2], true).unwrap();
        assert_eq!(closed.len(), 5 + 4);
        assert_eq!(closed.last(), Some(&Pos::new(0, 0)));
        assert!(o.expand_tour(&[], true).unwrap().is_empty());
        assert_eq!(o.expand_tour(&[1], true).unwrap(), vec![Pos::new(2, 0)]);
    }

    #[test]
    fn distance_function_closure() {
        let g = GridGraph::empty(4, 4).unwrap();
        let d = distance_function(&g, vec![Pos::new(0, 0), Pos::new(3, 3)]).unwrap();
        assert_eq!(d(0, 1), 6.0);
        assert_eq!(d(1, 1), 0.0);
    }
}
