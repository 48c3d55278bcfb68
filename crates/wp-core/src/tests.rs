//! Unit tests for wp-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, CellId};

    #[test]
    fn index_matches_inner_value() {
        assert_eq!(AgentId(42).index(), 42);
        assert_eq!(CellId(u32::MAX).index(), u32::MAX as usize);
        assert!(AgentId(1) < AgentId(2));
    }

    #[test]
    fn display_names_the_kind() {
        assert_eq!(AgentId(7).to_string(), "agent 7");
        assert_eq!(CellId(12).to_string(), "cell 12");
    }
}

#[cfg(test)]
mod pos {
    use std::f64::consts::SQRT_2;

    use crate::Pos;

    #[test]
    fn manhattan_distance() {
        assert_eq!(Pos::new(0, 0).manhattan(Pos::new(3, -4)), 7.0);
    }

    #[test]
    fn octile_matches_straight_and_diagonal_runs() {
        // 3 diagonal steps + 1 straight step.
        let d = Pos::new(0, 0).octile(Pos::new(4, 3));
        assert!((d - (3.0 * SQRT_2 + 1.0)).abs() < 1e-12, "got {d}");
        assert_eq!(Pos::new(2, 2).octile(Pos::new(2, 7)), 5.0);
    }

    #[test]
    fn octile_never_exceeds_manhattan() {
        for x in -5..=5 {
            for y in -5..=5 {
                let p = Pos::new(x, y);
                assert!(Pos::default().octile(p) <= Pos::default().manhattan(p) + 1e-12);
            }
        }
    }

    #[test]
    fn step_costs() {
        let o = Pos::new(1, 1);
        assert_eq!(o.step_cost_to(o.offset(1, 0)), 1.0);
        assert_eq!(o.step_cost_to(o.offset(-1, 1)), SQRT_2);
    }
}

#[cfg(test)]
mod time {
    use std::collections::BTreeMap;

    use crate::SimTime;

    #[test]
    fn arithmetic() {
        let t = SimTime(1.5) + 0.25;
        assert_eq!(t, SimTime(1.75));
        assert_eq!(SimTime(2.0) - SimTime(0.5), 1.5);
        assert_eq!(SimTime(3.0).since(SimTime(1.0)), 2.0);
    }

    #[test]
    fn total_order_keys_btreemap() {
        let mut m = BTreeMap::new();
        m.insert(SimTime(0.4), "b");
        m.insert(SimTime(0.2), "a");
        m.insert(SimTime(1.0), "c");
        let keys: Vec<_> = m.values().copied().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn display() {
        assert_eq!(SimTime(0.2).to_string(), "t=0.200");
    }
}

#[cfg(test)]
mod deadline {
    use std::time::Duration;

    use crate::{CancelToken, Deadline};

    #[test]
    fn none_never_expires() {
        assert!(!Deadline::none().expired());
    }

    #[test]
    fn zero_limit_expires_immediately() {
        assert!(Deadline::after(Duration::ZERO).expired());
    }

    #[test]
    fn cancel_token_trips_deadline() {
        let token = CancelToken::new();
        let d = Deadline::after(Duration::from_secs(3600)).with_cancel(token.clone());
        assert!(!d.expired());
        token.cancel();
        assert!(d.expired());
    }

    #[test]
    fn sub_deadline_inherits_parent_limit_and_token() {
        let token = CancelToken::new();
        let parent = Deadline::after(Duration::ZERO).with_cancel(token.clone());
        // Parent already expired, so the nested budget is zero too.
        assert!(parent.sub(Some(Duration::from_secs(60))).expired());

        let parent = Deadline::none().with_cancel(token.clone());
        let child = parent.sub(None);
        assert!(!child.expired());
        token.cancel();
        assert!(child.expired());
    }
}

#[cfg(test)]
mod dist {
    use crate::{DistanceMatrix, Distances};

    #[test]
    fn from_rows_rejects_ragged() {
        assert!(DistanceMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0]]).is_none());
    }

    #[test]
    fn symmetric_builder_mirrors() {
        let m = DistanceMatrix::symmetric_from_fn(4, |i, j| (i * 10 + j) as f64);
        assert!(m.is_symmetric());
        assert_eq!(m.distance(1, 3), 13.0);
        assert_eq!(m.distance(3, 1), 13.0);
        assert_eq!(m.distance(2, 2), 0.0);
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn from_fn_zeroes_diagonal() {
        let m = DistanceMatrix::from_fn(3, |_, _| 5.0);
        assert_eq!(m.row(1), &[5.0, 0.0, 5.0]);
    }
}

#[cfg(test)]
mod rng {
    use crate::SolverRng;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SolverRng::new(7);
        let mut b = SolverRng::new(7);
        for _ in 0..16 {
            assert_eq!(a.gen_range(0..1_000u32), b.gen_range(0..1_000u32));
        }
    }

    #[test]
    fn children_are_reproducible() {
        let mut a = SolverRng::new(99);
        let mut b = SolverRng::new(99);
        let mut ca = a.child(3);
        let mut cb = b.child(3);
        assert_eq!(ca.unit(), cb.unit());
    }

    #[test]
    fn distinct_pair_is_ordered_and_distinct() {
        let mut r = SolverRng::new(1);
        for _ in 0..200 {
            let (a, b) = r.distinct_pair(1, 5);
            assert!(a < b);
            assert!((1..5).contains(&a) && (1..5).contains(&b));
        }
    }
}

#[cfg(test)]
mod errors {
    use crate::error::{check_at_least, check_positive, check_probability};

    #[test]
    fn validation_helpers() {
        assert!(check_probability("pc", 0.9).is_ok());
        assert!(check_probability("pc", 1.1).is_err());
        assert!(check_positive("step", 0.0).is_err());
        assert!(check_positive("step", f64::INFINITY).is_err());
        assert!(check_at_least("pop", 1, 2).is_err());
        let msg = check_at_least("pop", 1, 2).unwrap_err().to_string();
        assert!(msg.contains("pop"), "{msg}");
    }
}
