//! Gesture Recognizer Pool - One shared recognizer per (view, kind)
//!
//! Attaching two recognizers of the same kind to one view makes them fight
//! over the gesture. The pool hands out holder tickets for a single shared
//! instance instead, attaching it on first checkout and detaching it when the
//! last holder releases.
//!
//! The pool is also the only place that changes a recognizer's enablement.
//! A shared recognizer stays enabled while at least one holder wants it.
//!
//! # API
//!
//! - `dequeue(view, kind)` - Check out the shared recognizer (None if the view refuses)
//! - `adopt(view, recognizer)` - Check out a caller-supplied recognizer
//! - `release(handle)` - Return a ticket; the last one detaches
//! - `set_enabled(handle, bool)` - Record a holder's enablement wish

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::platform::{GestureRecognizer, View};
use crate::types::{RecognizerId, RecognizerKind, ViewId};

// =============================================================================
// TYPES
// =============================================================================

/// A holder's ticket for a pooled recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecognizerHandle {
    view: ViewId,
    kind: RecognizerKind,
    ticket: u64,
}

impl RecognizerHandle {
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn kind(&self) -> RecognizerKind {
        self.kind
    }

    fn key(&self) -> (ViewId, RecognizerKind) {
        (self.view, self.kind)
    }
}

/// Outcome of returning a ticket.
pub(crate) enum Checkin {
    /// Unknown or already released ticket.
    Stale,
    /// Other holders remain.
    Shared,
    /// Last holder; the recognizer was detached.
    Discarded(GestureRecognizer),
}

struct PoolEntry {
    view: View,
    recognizer: GestureRecognizer,
    /// Ticket → wants enabled
    holders: HashMap<u64, bool>,
}

impl PoolEntry {
    fn wants_enabled(&self) -> bool {
        self.holders.values().any(|enabled| *enabled)
    }
}

#[derive(Default)]
struct PoolState {
    entries: HashMap<(ViewId, RecognizerKind), PoolEntry>,
    next_ticket: u64,
}

impl PoolState {
    fn ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }
}

/// Reference-counted arena of gesture recognizers.
///
/// Cloning a `GestureRecognizerPool` creates a new handle to the **same** pool.
#[derive(Clone, Default)]
pub struct GestureRecognizerPool {
    state: Rc<RefCell<PoolState>>,
}

// =============================================================================
// CHECKOUT / RELEASE
// =============================================================================

impl GestureRecognizerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check out the recognizer of `kind` for `view`, creating and attaching it
    /// on first use.
    ///
    /// Returns None if the view is not accepting recognizers.
    pub fn dequeue(&self, view: &View, kind: RecognizerKind) -> Option<RecognizerHandle> {
        if !view.host().accepts_recognizers() {
            tracing::debug!(view = ?view.id(), ?kind, "view refused recognizer");
            return None;
        }

        let key = (view.id(), kind);
        let mut state = self.state.borrow_mut();
        let ticket = state.ticket();

        if let Some(entry) = state.entries.get_mut(&key) {
            entry.holders.insert(ticket, true);
            let reenable = !entry.recognizer.is_enabled();
            let recognizer = entry.recognizer.clone();
            drop(state);
            if reenable {
                recognizer.set_enabled(true);
            }
            tracing::debug!(view = ?key.0, ?kind, ticket, "recognizer shared");
            return Some(RecognizerHandle { view: key.0, kind, ticket });
        }

        let recognizer = GestureRecognizer::new(kind);
        state.entries.insert(
            key,
            PoolEntry {
                view: view.clone(),
                recognizer: recognizer.clone(),
                holders: HashMap::from([(ticket, true)]),
            },
        );
        drop(state);

        view.host().attach_recognizer(&recognizer);
        tracing::debug!(view = ?key.0, ?kind, recognizer = ?recognizer.id(), "recognizer created");
        Some(RecognizerHandle { view: key.0, kind, ticket })
    }

    /// Check out a caller-supplied recognizer for `view`.
    ///
    /// If the pool already holds this exact instance for the view it is shared.
    /// Returns None if the view refuses, or if a different recognizer of the
    /// same kind already occupies the slot.
    pub fn adopt(&self, view: &View, recognizer: GestureRecognizer) -> Option<RecognizerHandle> {
        if !view.host().accepts_recognizers() {
            tracing::debug!(view = ?view.id(), "view refused recognizer");
            return None;
        }

        let kind = recognizer.kind();
        let key = (view.id(), kind);
        let mut state = self.state.borrow_mut();

        if let Some(entry) = state.entries.get(&key) {
            if !entry.recognizer.ptr_eq(&recognizer) {
                tracing::warn!(
                    view = ?key.0,
                    ?kind,
                    pooled = ?entry.recognizer.id(),
                    offered = ?recognizer.id(),
                    "recognizer slot already taken"
                );
                return None;
            }
            let ticket = state.ticket();
            if let Some(entry) = state.entries.get_mut(&key) {
                entry.holders.insert(ticket, true);
            }
            drop(state);
            recognizer.set_enabled(true);
            return Some(RecognizerHandle { view: key.0, kind, ticket });
        }

        let ticket = state.ticket();
        state.entries.insert(
            key,
            PoolEntry {
                view: view.clone(),
                recognizer: recognizer.clone(),
                holders: HashMap::from([(ticket, true)]),
            },
        );
        drop(state);

        view.host().attach_recognizer(&recognizer);
        recognizer.set_enabled(true);
        tracing::debug!(view = ?key.0, ?kind, recognizer = ?recognizer.id(), "recognizer adopted");
        Some(RecognizerHandle { view: key.0, kind, ticket })
    }

    /// Return a ticket. The last holder's release detaches and discards the
    /// recognizer. Returns false for stale tickets.
    pub fn release(&self, handle: &RecognizerHandle) -> bool {
        !matches!(self.checkin(handle), Checkin::Stale)
    }

    pub(crate) fn checkin(&self, handle: &RecognizerHandle) -> Checkin {
        let mut state = self.state.borrow_mut();
        let Some(entry) = state.entries.get_mut(&handle.key()) else {
            return Checkin::Stale;
        };
        if entry.holders.remove(&handle.ticket).is_none() {
            return Checkin::Stale;
        }

        if !entry.holders.is_empty() {
            let recognizer = entry.recognizer.clone();
            let enabled = entry.wants_enabled();
            drop(state);
            recognizer.set_enabled(enabled);
            return Checkin::Shared;
        }

        let Some(entry) = state.entries.remove(&handle.key()) else {
            return Checkin::Stale;
        };
        drop(state);

        entry.view.host().detach_recognizer(&entry.recognizer);
        tracing::debug!(view = ?handle.view, kind = ?handle.kind, recognizer = ?entry.recognizer.id(), "recognizer discarded");
        Checkin::Discarded(entry.recognizer)
    }

    /// Detach and discard every recognizer on `view`, regardless of holders.
    pub fn release_view(&self, view: ViewId) -> Vec<GestureRecognizer> {
        let removed: Vec<PoolEntry> = {
            let mut state = self.state.borrow_mut();
            let keys: Vec<_> = state
                .entries
                .keys()
                .filter(|(owner, _)| *owner == view)
                .copied()
                .collect();
            keys.iter()
                .filter_map(|key| state.entries.remove(key))
                .collect()
        };
        removed
            .into_iter()
            .map(|entry| {
                entry.view.host().detach_recognizer(&entry.recognizer);
                entry.recognizer
            })
            .collect()
    }

    /// Detach and discard everything.
    pub fn clear(&self) -> Vec<GestureRecognizer> {
        let removed: Vec<PoolEntry> = self
            .state
            .borrow_mut()
            .entries
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        removed
            .into_iter()
            .map(|entry| {
                entry.view.host().detach_recognizer(&entry.recognizer);
                entry.recognizer
            })
            .collect()
    }
}

// =============================================================================
// ENABLEMENT
// =============================================================================

impl GestureRecognizerPool {
    /// Record whether this holder wants the recognizer enabled.
    ///
    /// Returns false for stale tickets.
    pub fn set_enabled(&self, handle: &RecognizerHandle, enabled: bool) -> bool {
        let recognizer_and_state = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.entries.get_mut(&handle.key()) else {
                return false;
            };
            let Some(wish) = entry.holders.get_mut(&handle.ticket) else {
                return false;
            };
            *wish = enabled;
            (entry.recognizer.clone(), entry.wants_enabled())
        };
        let (recognizer, effective) = recognizer_and_state;
        recognizer.set_enabled(effective);
        true
    }

    /// Whether the recognizer behind `handle` is enabled, or None for stale tickets.
    pub fn is_enabled(&self, handle: &RecognizerHandle) -> Option<bool> {
        self.recognizer(handle).map(|recognizer| recognizer.is_enabled())
    }
}

// =============================================================================
// LOOKUPS
// =============================================================================

impl GestureRecognizerPool {
    /// The shared recognizer behind a live ticket.
    pub fn recognizer(&self, handle: &RecognizerHandle) -> Option<GestureRecognizer> {
        let state = self.state.borrow();
        let entry = state.entries.get(&handle.key())?;
        entry
            .holders
            .contains_key(&handle.ticket)
            .then(|| entry.recognizer.clone())
    }

    /// Whether the pool currently holds the recognizer with `id` for any view.
    pub fn holds(&self, id: RecognizerId) -> bool {
        self.state
            .borrow()
            .entries
            .values()
            .any(|entry| entry.recognizer.id() == id)
    }

    /// The recognizer of `kind` on `view`, if any.
    pub fn recognizer_for(&self, view: ViewId, kind: RecognizerKind) -> Option<GestureRecognizer> {
        self.state
            .borrow()
            .entries
            .get(&(view, kind))
            .map(|entry| entry.recognizer.clone())
    }

    /// Number of holders of the recognizer of `kind` on `view`.
    pub fn usage_count(&self, view: ViewId, kind: RecognizerKind) -> usize {
        self.state
            .borrow()
            .entries
            .get(&(view, kind))
            .map(|entry| entry.holders.len())
            .unwrap_or(0)
    }

    /// Number of live recognizers.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================
