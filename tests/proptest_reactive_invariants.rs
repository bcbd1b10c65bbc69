//! Property-based invariant tests for the reactive runtime.
//!
//! These tests verify invariants that must hold for **any** sequence of
//! operations:
//!
//! 1. Every subscriber sees the replayed value plus every write, in order.
//! 2. The aggregate state matches a naive recount over the last report of
//!    every source.
//! 3. A toggled connection applies exactly the values emitted while enabled.
//! 4. The pool attaches a recognizer exactly while it has holders.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use spark_motion::{
    AggregateState, ConnectionRegistry, GestureRecognizerPool, HeadlessView, MotionState,
    ReactiveProperty, RecognizerKind, View,
};

// ── Strategies ──────────────────────────────────────────────────────────

fn motion_state() -> impl Strategy<Value = MotionState> {
    prop_oneof![
        Just(MotionState::Idle),
        Just(MotionState::Active),
        Just(MotionState::Settling),
    ]
}

/// (source index, reported state) pairs over up to 4 sources.
fn report_sequences() -> impl Strategy<Value = (usize, Vec<(usize, MotionState)>)> {
    (1usize..5).prop_flat_map(|sources| {
        (
            Just(sources),
            proptest::collection::vec((0..sources, motion_state()), 0..60),
        )
    })
}

#[derive(Debug, Clone)]
enum ToggleOp {
    Emit(i32),
    Enable,
    Disable,
}

fn toggle_ops() -> impl Strategy<Value = Vec<ToggleOp>> {
    proptest::collection::vec(
        prop_oneof![
            3 => any::<i32>().prop_map(ToggleOp::Emit),
            1 => Just(ToggleOp::Enable),
            1 => Just(ToggleOp::Disable),
        ],
        0..80,
    )
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn naive_merge(last: &[MotionState]) -> MotionState {
    if last.contains(&MotionState::Active) {
        MotionState::Active
    } else if last.contains(&MotionState::Settling) {
        MotionState::Settling
    } else {
        MotionState::Idle
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Replay plus every write, in order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn subscribers_see_replay_then_every_write(
        initial in any::<i64>(),
        writes in proptest::collection::vec(any::<i64>(), 0..50),
        subscribers in 1usize..6,
    ) {
        let property = ReactiveProperty::new(initial);
        let logs: Vec<Rc<RefCell<Vec<i64>>>> = (0..subscribers)
            .map(|_| {
                let log = Rc::new(RefCell::new(Vec::new()));
                let sink = Rc::clone(&log);
                property.subscribe(move |value| sink.borrow_mut().push(*value));
                log
            })
            .collect();

        for value in &writes {
            property.write(*value);
        }

        let mut expected = vec![initial];
        expected.extend(writes.iter().copied());
        for log in &logs {
            let seen = log.borrow().clone();
            prop_assert_eq!(seen.len(), writes.len() + 1);
            prop_assert_eq!(seen, expected.clone());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Aggregate matches a naive recount
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn aggregate_matches_naive_merge((sources, reports) in report_sequences()) {
        let registry = ConnectionRegistry::new();
        let aggregate = AggregateState::new();
        let inputs: Vec<ReactiveProperty<MotionState>> = (0..sources)
            .map(|_| ReactiveProperty::new(MotionState::Idle))
            .collect();
        for input in &inputs {
            aggregate.observe(input.stream(), &registry);
        }

        let mut last = vec![MotionState::Idle; sources];
        for (source, state) in reports {
            inputs[source].write(state);
            last[source] = state;
            prop_assert_eq!(aggregate.current(), naive_merge(&last));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Toggled connections apply exactly the enabled emissions
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn toggled_connection_applies_enabled_values(ops in toggle_ops()) {
        let registry = ConnectionRegistry::new();
        let source = ReactiveProperty::new(0);
        let sink = ReactiveProperty::new(0);
        let applied = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&applied);
        sink.subscribe(move |value| log.borrow_mut().push(*value));

        let handle = registry.connect(&source.stream(), &sink, None);

        let mut enabled = true;
        let mut expected = vec![0, 0];
        for op in ops {
            match op {
                ToggleOp::Emit(value) => {
                    source.write(value);
                    if enabled {
                        expected.push(value);
                    }
                }
                ToggleOp::Enable => {
                    enabled = true;
                    registry.set_enabled(handle, true);
                }
                ToggleOp::Disable => {
                    enabled = false;
                    registry.set_enabled(handle, false);
                }
            }
        }

        let seen = applied.borrow().clone();
        prop_assert_eq!(seen, expected.clone());
        prop_assert_eq!(sink.read(), *expected.last().unwrap());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Pool attachment follows holder count
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn pool_attached_exactly_while_held(ops in proptest::collection::vec(any::<bool>(), 0..40)) {
        let pool = GestureRecognizerPool::new();
        let host = HeadlessView::new(1);
        let view = View::from_rc(host.clone());
        let mut held = Vec::new();

        // true = dequeue, false = release the oldest holder
        for dequeue in ops {
            if dequeue {
                held.push(pool.dequeue(&view, RecognizerKind::Rotation).unwrap());
            } else if !held.is_empty() {
                let handle = held.remove(0);
                prop_assert!(pool.release(&handle));
            }

            prop_assert_eq!(pool.usage_count(view.id(), RecognizerKind::Rotation), held.len());
            prop_assert_eq!(host.attached_count(), usize::from(!held.is_empty()));
        }
    }
}
