//! Unit tests for wp-exec.
//!
//! Scenarios use tiny hand-built grids with step times chosen so that the
//! expected timelines can be worked out by hand.

#[cfg(test)]
mod helpers {
    use wp_core::Pos;
    use wp_grid::{GridGraph, GridGraphBuilder};

    pub fn open(w: i32, h: i32) -> GridGraph {
        GridGraph::empty(w, h).unwrap()
    }

    /// A `w × 1` corridor.
    pub fn corridor(w: i32) -> GridGraph {
        GridGraph::empty(w, 1).unwrap()
    }

    /// 5×3: row 1 is the direct aisle, row 0 a longer bypass, row 2 walls.
    pub fn aisle_with_bypass() -> GridGraph {
        let mut b = GridGraphBuilder::new(5, 3);
        b.add_rect_obstacle(0, 2, 4, 2);
        b.build().unwrap()
    }

    /// Straight horizontal run `(x0, y)..=(x1, y)`, either direction.
    pub fn row(y: i32, x0: i32, x1: i32) -> Vec<Pos> {
        if x0 <= x1 {
            (x0..=x1).map(|x| Pos::new(x, y)).collect()
        } else {
            (x1..=x0).rev().map(|x| Pos::new(x, y)).collect()
        }
    }

    pub fn column(x: i32, y0: i32, y1: i32) -> Vec<Pos> {
        (y0..=y1).map(|y| Pos::new(x, y)).collect()
    }
}

// ── Event queue ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use wp_core::SimTime;

    use crate::EventQueue;

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        q.push(SimTime(2.0), 'c');
        q.push(SimTime(0.5), 'a');
        q.push(SimTime(1.0), 'b');
        assert_eq!(q.next_time(), Some(SimTime(0.5)));
        let order: Vec<char> = std::iter::from_fn(|| q.pop().map(|(_, e)| e)).collect();
        assert_eq!(order, vec!['a', 'b', 'c']);
        assert!(q.is_empty());
    }

    #[test]
    fn same_instant_is_fifo() {
        let mut q = EventQueue::new();
        for k in 0..5 {
            q.push(SimTime(1.0), k);
        }
        q.push(SimTime(0.0), 99);
        assert_eq!(q.len(), 6);
        assert_eq!(q.instant_count(), 2);
        assert_eq!(q.pop(), Some((SimTime(0.0), 99)));
        for k in 0..5 {
            assert_eq!(q.pop(), Some((SimTime(1.0), k)));
        }
        assert_eq!(q.pop(), None);
        assert_eq!(q.instant_count(), 0);
    }
}

// ── Cell resources ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cells {
    use wp_core::{AgentId, Pos};
    use wp_grid::GridGraphBuilder;

    use crate::{Acquire, CellPool, ExecError};

    #[test]
    fn one_resource_per_free_cell() {
        let mut b = GridGraphBuilder::new(3, 3);
        b.add_obstacle(Pos::new(1, 1));
        let pool = CellPool::from_grid(&b.build().unwrap());
        assert_eq!(pool.len(), 8);
        assert!(!pool.contains(Pos::new(1, 1)));
    }

    #[test]
    fn release_hands_over_in_fifo_order() {
        let mut pool = CellPool::from_grid(&super::helpers::corridor(2));
        let c = Pos::new(0, 0);
        let (a, b, d) = (AgentId(0), AgentId(1), AgentId(2));
        assert_eq!(pool.request(c, a).unwrap(), Acquire::Granted);
        assert_eq!(pool.request(c, b).unwrap(), Acquire::Queued { holder: a });
        assert_eq!(pool.request(c, d).unwrap(), Acquire::Queued { holder: a });
        assert_eq!(pool.get(c).unwrap().waiting(), 2);

        assert_eq!(pool.release(c, a).unwrap(), Some(b));
        assert_eq!(pool.holder(c), Some(b));
        assert_eq!(pool.release(c, b).unwrap(), Some(d));
        assert_eq!(pool.release(c, d).unwrap(), None);
        assert_eq!(pool.occupied(), 0);
    }

    #[test]
    fn misuse_is_an_error() {
        let mut pool = CellPool::from_grid(&super::helpers::corridor(2));
        let c = Pos::new(1, 0);
        pool.request(c, AgentId(0)).unwrap();
        assert!(matches!(pool.release(c, AgentId(1)), Err(ExecError::NotHolder { .. })));
        assert!(matches!(pool.request(Pos::new(5, 5), AgentId(0)), Err(ExecError::UnknownCell(_))));
    }
}

// ── Fixed-path executor ───────────────────────────────────────────────────────

#[cfg(test)]
mod executor {
    use wp_core::{AgentId, Pos, SimTime};
    use wp_grid::{DistanceOracle, GridGraphBuilder};

    use super::helpers::{column, corridor, open, row};
    use crate::{
        AgentOutcome, CollisionStats, ExecConfig, ExecError, ExecObserver, Executor, simulate,
        theoretical_makespan,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn lone_agent_meets_theoretical_makespan() {
        let grid = open(6, 6);
        let paths = vec![row(0, 0, 5)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert_eq!(stats.total_collisions, 0);
        assert!(close(stats.makespan, theoretical_makespan(&paths, 0.2)));
        assert!(close(stats.makespan, 1.0));
        assert!(stats.all_finished());
    }

    #[test]
    fn disjoint_agents_do_not_interact() {
        let grid = open(6, 6);
        let paths = vec![row(0, 0, 5), row(3, 5, 0), row(5, 1, 4)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert_eq!(stats.total_collisions, 0);
        assert_eq!(stats.total_wait_time, 0.0);
        assert!(close(stats.makespan, theoretical_makespan(&paths, 0.2)));
        assert_eq!(stats.finished_count(), 3);
    }

    #[test]
    fn crossing_paths_collide() {
        // Both agents reach (2, 2) at t = 0.4.
        let grid = open(5, 5);
        let paths = vec![row(2, 0, 4), column(2, 0, 4)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert!(stats.total_collisions >= 1);
        assert!(stats.total_wait_time > 0.0);
        assert!(stats.max_wait_time <= stats.total_wait_time);
        assert_eq!(stats.collision_locations[0], Pos::new(2, 2));
        assert!(stats.agent_wait_times[1] > 0.0);
        assert_eq!(stats.agent_wait_times[0], 0.0);
        assert!(stats.makespan > theoretical_makespan(&paths, 0.2));
        assert!(stats.all_finished());
    }

    #[test]
    fn follower_waits_one_step() {
        let grid = corridor(4);
        let paths = vec![row(0, 0, 3), row(0, 0, 3)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert_eq!(stats.total_collisions, 1);
        assert!(close(stats.total_wait_time, 0.2));
        assert!(close(stats.mean_wait(), 0.2));
        assert!(close(stats.makespan, 0.8));
        match stats.outcomes[1] {
            AgentOutcome::Finished(t) => assert!(close(t.as_f64(), 0.8)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn adjacent_swap_deadlocks() {
        // Both queue at t = 0.2 on the cell the other holds.
        let grid = corridor(2);
        let paths = vec![row(0, 0, 1), row(0, 1, 0)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert_eq!(stats.outcomes, vec![AgentOutcome::Deadlocked, AgentOutcome::Deadlocked]);
        assert_eq!(stats.total_collisions, 2);
        assert_eq!(stats.collision_locations, vec![Pos::new(1, 0), Pos::new(0, 0)]);
        assert_eq!(stats.wait_events.len(), 2);
        assert!(close(stats.total_wait_time, 0.0));
        assert!(close(stats.makespan, 0.2));
    }

    #[test]
    fn deadlock_short_of_the_goal_counts_collisions() {
        // The agents meet mid-corridor at t = 0.4, before their 0.6 finish.
        let grid = corridor(4);
        let paths = vec![row(0, 0, 3), row(0, 3, 0)];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert_eq!(stats.finished_count(), 0);
        assert_eq!(stats.total_collisions, 2);
        assert!(close(stats.makespan, 0.4));
        let theoretical = theoretical_makespan(&paths, 0.2);
        assert!(close(theoretical, 0.6));
        assert!(stats.total_collisions > 0 || close(stats.makespan, theoretical));
    }

    #[test]
    fn cutoff_charges_pending_waits() {
        // Agent 1 queues on (0, 0) at t = 0 and is still queued at the cutoff.
        let grid = corridor(10);
        let cfg = ExecConfig { cutoff: Some(0.1), ..ExecConfig::default() };
        let stats = simulate(&grid, &[row(0, 0, 9), vec![Pos::new(0, 0)]], &cfg).unwrap();
        assert_eq!(stats.outcomes, vec![AgentOutcome::TimedOut, AgentOutcome::TimedOut]);
        assert_eq!(stats.total_collisions, 1);
        assert!(close(stats.total_wait_time, 0.1));
        assert!(close(stats.agent_wait_times[1], 0.1));
        assert_eq!(stats.agent_wait_times[0], 0.0);
    }

    #[test]
    fn cutoff_times_out_long_paths() {
        let grid = corridor(10);
        let cfg = ExecConfig { cutoff: Some(0.5), ..ExecConfig::default() };
        // Both start on (0, 0); the single-cell agent waits for it.
        let stats = simulate(&grid, &[row(0, 0, 9), vec![Pos::new(0, 0)]], &cfg).unwrap();
        assert_eq!(stats.outcomes[0], AgentOutcome::TimedOut);
        assert!(stats.outcomes[1].is_finished());
        assert_eq!(stats.makespan, 0.5);
    }

    #[test]
    fn empty_path_finishes_immediately() {
        let stats = simulate(&corridor(3), &[Vec::new()], &ExecConfig::default()).unwrap();
        assert_eq!(stats.outcomes, vec![AgentOutcome::Finished(SimTime::ZERO)]);
        assert_eq!(stats.makespan, 0.0);
    }

    #[test]
    fn malformed_input_rejected() {
        let mut b = GridGraphBuilder::new(3, 1);
        b.add_obstacle(Pos::new(1, 0));
        let walled = b.build().unwrap();
        assert!(matches!(
            simulate(&walled, &[row(0, 0, 2)], &ExecConfig::default()),
            Err(ExecError::NotFree { index: 1, .. })
        ));

        let jump = vec![Pos::new(0, 0), Pos::new(2, 0)];
        assert!(matches!(
            simulate(&corridor(3), &[jump], &ExecConfig::default()),
            Err(ExecError::NotAdjacent { index: 0, .. })
        ));

        assert!(matches!(
            Executor::new(ExecConfig { step_time: 0.0, ..ExecConfig::default() }),
            Err(ExecError::Config(_))
        ));
    }

    #[derive(Default)]
    struct Tally {
        collisions: usize,
        acquired:   usize,
        ended:      Vec<(AgentId, AgentOutcome)>,
        runs:       usize,
    }

    impl ExecObserver for Tally {
        fn on_acquire(&mut self, _: AgentId, _: Pos, _: SimTime) {
            self.acquired += 1;
        }
        fn on_collision(&mut self, _: AgentId, _: Pos, _: f64, _: SimTime) {
            self.collisions += 1;
        }
        fn on_agent_end(&mut self, agent: AgentId, outcome: AgentOutcome) {
            self.ended.push((agent, outcome));
        }
        fn on_run_end(&mut self, _: &CollisionStats) {
            self.runs += 1;
        }
    }

    #[test]
    fn observer_sees_every_event() {
        let grid = open(5, 5);
        let paths = vec![row(2, 0, 4), column(2, 0, 4)];
        let mut tally = Tally::default();
        let stats = Executor::default().simulate_observed(&grid, &paths, &mut tally).unwrap();
        assert_eq!(tally.collisions, stats.total_collisions);
        assert_eq!(tally.acquired, 10);
        assert_eq!(tally.ended.len(), 2);
        assert_eq!(tally.runs, 1);
    }

    #[test]
    fn expanded_tours_execute() {
        // Reference obstacle layout; two agents cover the waypoints in
        // opposite directions.
        let mut b = GridGraphBuilder::new(7, 7);
        for (x, y) in [(1, 1), (1, 2), (2, 1), (3, 3), (4, 4)] {
            b.add_obstacle(Pos::new(x, y));
        }
        let grid = b.build().unwrap();
        let wps = vec![Pos::new(0, 0), Pos::new(6, 0), Pos::new(6, 6), Pos::new(0, 6)];
        let oracle = DistanceOracle::new(&grid, wps).unwrap();
        let paths = vec![
            oracle.expand_tour(&[0, 1, 2, 3], true).unwrap(),
            oracle.expand_tour(&[2, 3, 0, 1], false).unwrap(),
        ];
        let stats = simulate(&grid, &paths, &ExecConfig::default()).unwrap();
        assert!(stats.total_wait_time >= 0.0);
        assert!(stats.max_wait_time <= stats.total_wait_time);
        assert!(stats.makespan >= theoretical_makespan(&paths, 0.2) - 1e-9);
        if stats.total_collisions == 0 {
            assert!(close(stats.makespan, theoretical_makespan(&paths, 0.2)));
        }
    }
}

// ── Replanning executor ───────────────────────────────────────────────────────

#[cfg(test)]
mod replan {
    use wp_core::Pos;

    use super::helpers::{aisle_with_bypass, corridor, open};
    use crate::{
        AgentOutcome, BlockerConfig, ExecError, ForcedBlock, Order, ReplanConfig, ReplanExecutor,
    };

    fn quiet() -> ReplanConfig {
        ReplanConfig { blocker: BlockerConfig::disabled(), ..ReplanConfig::default() }
    }

    fn order(id: u32, start: (i32, i32), goal: (i32, i32)) -> Order {
        Order { id, start: start.into(), goal: goal.into() }
    }

    #[test]
    fn unobstructed_order_takes_route_length() {
        let report = ReplanExecutor::new(quiet())
            .unwrap()
            .run(&aisle_with_bypass(), &[order(7, (0, 1), (4, 1))])
            .unwrap();
        let o = &report.orders[0];
        assert_eq!(o.id, 7);
        assert!(o.success);
        assert_eq!(o.replan_count, 0);
        assert_eq!(o.exec_time, 4.0);
        assert_eq!(report.success_rate(), 1.0);
        assert_eq!(report.blockages, 0);
    }

    #[test]
    fn forced_block_triggers_detour() {
        // (2, 1) closes at t = 0.5; the robot notices at t = 1 from (1, 1)
        // and takes the 5-step bypass.
        let exec = ReplanExecutor::new(quiet())
            .unwrap()
            .force_block(ForcedBlock { cell: Pos::new(2, 1), at: 0.5, duration: 100.0 })
            .unwrap();
        let report = exec.run(&aisle_with_bypass(), &[order(0, (0, 1), (4, 1))]).unwrap();
        let o = &report.orders[0];
        assert!(o.success);
        assert_eq!(o.replan_count, 1);
        assert_eq!(o.exec_time, 6.0);
        assert_eq!(report.total_replans(), 1);
    }

    #[test]
    fn retries_until_blockage_clears() {
        // In a corridor there is no detour: wait at (1, 0) until t = 3.5,
        // replan at the next retry (t = 4), then two more steps.
        let exec = ReplanExecutor::new(quiet())
            .unwrap()
            .force_block(ForcedBlock { cell: Pos::new(2, 0), at: 0.5, duration: 3.0 })
            .unwrap();
        let report = exec.run(&corridor(4), &[order(0, (0, 0), (3, 0))]).unwrap();
        let o = &report.orders[0];
        assert!(o.success);
        assert_eq!(o.replan_count, 1);
        assert_eq!(o.exec_time, 6.0);
    }

    #[test]
    fn fully_blocked_route_fails() {
        let exec = ReplanExecutor::new(quiet())
            .unwrap()
            .force_block(ForcedBlock { cell: Pos::new(1, 0), at: 0.5, duration: 10.0 })
            .unwrap()
            .force_block(ForcedBlock { cell: Pos::new(2, 0), at: 0.5, duration: 10.0 })
            .unwrap();
        let report = exec.run(&corridor(3), &[order(0, (0, 0), (2, 0))]).unwrap();
        let o = &report.orders[0];
        assert!(!o.success);
        assert_eq!(o.outcome, AgentOutcome::Failed);
        assert_eq!(o.replan_count, 1);
        assert_eq!(o.exec_time, 1.0);
    }

    #[test]
    fn cutoff_abandons_unfinished_orders() {
        let cfg = ReplanConfig { cutoff: 2.5, ..quiet() };
        let report = ReplanExecutor::new(cfg).unwrap().run(&corridor(10), &[order(0, (0, 0), (9, 0))]).unwrap();
        let o = &report.orders[0];
        assert!(!o.success);
        assert_eq!(o.outcome, AgentOutcome::TimedOut);
        assert_eq!(o.exec_time, 2.5);
        assert_eq!(report.stats.makespan, 2.5);
    }

    #[test]
    fn head_on_robots_deadlock_without_blockages() {
        let report = ReplanExecutor::new(quiet())
            .unwrap()
            .run(&corridor(5), &[order(0, (0, 0), (4, 0)), order(1, (4, 0), (0, 0))])
            .unwrap();
        assert!(report.orders.iter().all(|o| o.outcome == AgentOutcome::Deadlocked));
        assert_eq!(report.success_rate(), 0.0);
        assert_eq!(report.stats.makespan, 2.0);
        // Robot 1 queues on (2, 0) at t = 1, robot 0 on (3, 0) at t = 2.
        assert_eq!(report.stats.total_collisions, 2);
        assert_eq!(report.stats.total_wait_time, 1.0);
        assert_eq!(report.orders[0].waits, 0.0);
        assert_eq!(report.orders[1].waits, 1.0);
    }

    #[test]
    fn stochastic_blocker_is_seeded() {
        let cfg = ReplanConfig {
            blocker: BlockerConfig { mean_interval: 0.5, mean_duration: 2.0, seed: 11, enabled: true },
            ..ReplanConfig::default()
        };
        let orders = [order(0, (0, 0), (7, 7)), order(1, (7, 0), (0, 7)), order(2, (0, 3), (7, 4))];
        let exec = ReplanExecutor::new(cfg).unwrap();
        let a = exec.run(&open(8, 8), &orders).unwrap();
        let b = exec.run(&open(8, 8), &orders).unwrap();

        let key = |r: &crate::ReplanReport| -> Vec<(f64, usize, bool, f64)> {
            r.orders.iter().map(|o| (o.exec_time, o.replan_count, o.success, o.waits)).collect()
        };
        assert_eq!(key(&a), key(&b));
        assert_eq!(a.blockages, b.blockages);
        assert!(a.blockages >= 1);
        for o in &a.orders {
            assert_eq!(o.success, o.outcome.is_finished());
            assert!(o.waits >= 0.0);
        }
    }

    #[test]
    fn invalid_inputs_rejected() {
        let mut b = wp_grid::GridGraphBuilder::new(3, 1);
        b.add_obstacle(Pos::new(2, 0));
        let grid = b.build().unwrap();
        let err = ReplanExecutor::new(quiet()).unwrap().run(&grid, &[order(4, (0, 0), (2, 0))]);
        assert!(matches!(err, Err(ExecError::OrderEndpoint { order: 4, .. })));

        let bad = ReplanExecutor::new(quiet())
            .unwrap()
            .force_block(ForcedBlock { cell: Pos::new(0, 0), at: 1.0, duration: 0.0 });
        assert!(bad.is_err());

        let cfg = ReplanConfig { retry_interval: -1.0, ..quiet() };
        assert!(ReplanExecutor::new(cfg).is_err());
    }
}
