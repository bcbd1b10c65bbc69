//! Aggregate State - One merged liveness signal from many sources
//!
//! Several interactions on one element each report a [`MotionState`]. The
//! aggregate remembers every source's last report and counts how many are
//! Active and how many are Settling:
//!
//! - Active while any source is Active
//! - Settling while none is Active but some are Settling
//! - Idle only when every source is Idle
//!
//! Repeated identical reports from one source never double-count.
//!
//! # Example
//!
//! ```ignore
//! let state = AggregateState::new();
//! state.observe(pinch_gesture.state(), runtime.registry());
//! state.observe(rotation_gesture.state(), runtime.registry());
//! if state.current() == MotionState::Active { /* user is interacting */ }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::connection::{ConnectionHandle, ConnectionRegistry};
use crate::reactive::{Observer, ReactiveProperty, Stream, Subscription};
use crate::types::MotionState;

#[derive(Default)]
struct Tally {
    /// Source → last reported state
    sources: HashMap<u64, MotionState>,
    /// Connection → source
    connections: HashMap<ConnectionHandle, u64>,
    active: usize,
    settling: usize,
}

impl Tally {
    fn count(&mut self, state: MotionState, delta: isize) {
        let counter = match state {
            MotionState::Active => &mut self.active,
            MotionState::Settling => &mut self.settling,
            MotionState::Idle => return,
        };
        *counter = counter.saturating_add_signed(delta);
    }

    fn merged(&self) -> MotionState {
        if self.active > 0 {
            MotionState::Active
        } else if self.settling > 0 {
            MotionState::Settling
        } else {
            MotionState::Idle
        }
    }
}

struct Shared {
    tally: RefCell<Tally>,
    merged: ReactiveProperty<MotionState>,
    next_source: Cell<u64>,
}

impl Shared {
    fn report(&self, source: u64, state: MotionState) {
        let merged = {
            let mut tally = self.tally.borrow_mut();
            let Some(last) = tally.sources.get_mut(&source) else {
                return;
            };
            let previous = std::mem::replace(last, state);
            if previous == state {
                return;
            }
            tally.count(previous, -1);
            tally.count(state, 1);
            tally.merged()
        };
        self.publish(merged);
    }

    fn remove(&self, source: u64) {
        let merged = {
            let mut tally = self.tally.borrow_mut();
            tally.connections.retain(|_, owner| *owner != source);
            let Some(last) = tally.sources.remove(&source) else {
                return;
            };
            tally.count(last, -1);
            tally.merged()
        };
        self.publish(merged);
    }

    fn publish(&self, merged: MotionState) {
        if self.merged.read() != merged {
            tracing::trace!(?merged, "aggregate state changed");
            self.merged.write(merged);
        }
    }
}

/// Merged [`MotionState`] over any number of observed sources.
///
/// Cloning an `AggregateState` creates a new handle to the **same** aggregate.
#[derive(Clone)]
pub struct AggregateState {
    shared: Rc<Shared>,
}

impl Default for AggregateState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AggregateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tally = self.shared.tally.borrow();
        f.debug_struct("AggregateState")
            .field("merged", &tally.merged())
            .field("sources", &tally.sources.len())
            .field("active", &tally.active)
            .field("settling", &tally.settling)
            .finish()
    }
}

impl AggregateState {
    pub fn new() -> Self {
        Self {
            shared: Rc::new(Shared {
                tally: RefCell::new(Tally::default()),
                merged: ReactiveProperty::new(MotionState::Idle),
                next_source: Cell::new(0),
            }),
        }
    }

    /// Add a contributing source, connected through `registry`.
    ///
    /// The source starts out Idle; whatever it replays on connection is
    /// counted immediately. Its contribution is dropped as soon as the
    /// connection goes away, whether through [`forget`](Self::forget) or the
    /// registry.
    pub fn observe(&self, states: Stream<MotionState>, registry: &ConnectionRegistry) -> ConnectionHandle {
        let source = self.shared.next_source.get();
        self.shared.next_source.set(source + 1);
        self.shared
            .tally
            .borrow_mut()
            .sources
            .insert(source, MotionState::Idle);

        let weak: Weak<Shared> = Rc::downgrade(&self.shared);
        let owner = Weak::clone(&weak);
        let sink = ReactiveProperty::with_interceptor(MotionState::Idle, move |state: &MotionState| {
            if let Some(shared) = weak.upgrade() {
                shared.report(source, *state);
            }
        });

        let tracked = Stream::new(move |observer: Observer<MotionState>| {
            let upstream = states.subscribe(move |state| observer(state));
            let owner = Weak::clone(&owner);
            Subscription::new(move || {
                drop(upstream);
                if let Some(shared) = owner.upgrade() {
                    shared.remove(source);
                }
            })
        });

        let handle = registry.connect(&tracked, &sink, None);
        self.shared
            .tally
            .borrow_mut()
            .connections
            .insert(handle, source);
        handle
    }

    /// Disconnect a source and drop its contribution. Returns false if unknown.
    pub fn forget(&self, registry: &ConnectionRegistry, handle: ConnectionHandle) -> bool {
        let source = self.shared.tally.borrow().connections.get(&handle).copied();
        let Some(source) = source else {
            return false;
        };
        // Disconnecting drops the source; remove it directly in case the
        // registry no longer knows the handle.
        registry.disconnect(handle);
        self.shared.remove(source);
        true
    }

    /// Current merged state.
    pub fn current(&self) -> MotionState {
        self.shared.merged.read()
    }

    /// Merged state as a stream, starting with the current value.
    pub fn state(&self) -> Stream<MotionState> {
        self.shared.merged.stream()
    }

    /// Number of contributing sources.
    pub fn source_count(&self) -> usize {
        self.shared.tally.borrow().sources.len()
    }
}

// =============================================================================
// TESTS
// =============================================================================
