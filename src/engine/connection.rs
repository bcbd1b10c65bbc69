//! Connection Registry - Live stream → property subscriptions
//!
//! Owns every active connection, keyed by handle and indexed by target
//! property. A connection pushes each value its stream emits into the sink
//! property, unless it is disabled.
//!
//! # Enablement
//!
//! A connection is live while its registry flag is set *and* its optional
//! [`Toggle`] reads true. Both are checked on every delivery, so a change takes
//! effect with the next emitted value. Disabling suppresses application at the
//! sink only: the upstream subscription keeps running and stateful stages keep
//! advancing.
//!
//! # API
//!
//! - `connect(stream, sink, toggle)` - Register a connection
//! - `disconnect(handle)` - Remove it (idempotent)
//! - `set_enabled(handle, bool)` - Suppress or resume delivery
//! - `disconnect_target(property)` - Remove every connection into a property

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::reactive::{ReactiveProperty, Stream, Subscription, Toggle};
use crate::types::{PropertyId, StreamId};

// =============================================================================
// TYPES
// =============================================================================

/// Identifies one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(u64);

struct ConnectionEntry {
    stream: StreamId,
    target: PropertyId,
    enabled: Rc<Cell<bool>>,
    toggle: Option<Rc<dyn Toggle>>,
    subscription: Subscription,
}

#[derive(Default)]
struct RegistryState {
    connections: HashMap<ConnectionHandle, ConnectionEntry>,
    next_id: u64,
}

/// Registry of live connections.
///
/// Cloning a `ConnectionRegistry` creates a new handle to the **same** registry.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    state: Rc<RefCell<RegistryState>>,
}

// =============================================================================
// IMPLEMENTATION
// =============================================================================

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect `stream` to `sink`, optionally gated by `toggle`.
    ///
    /// The stream is subscribed immediately, so values it replays on
    /// subscription reach the sink before this returns. Connecting the same
    /// stream description to the same sink again returns the existing handle.
    pub fn connect<T: Clone + 'static>(
        &self,
        stream: &Stream<T>,
        sink: &ReactiveProperty<T>,
        toggle: Option<Rc<dyn Toggle>>,
    ) -> ConnectionHandle {
        if let Some(existing) = self.find(stream.id(), sink.id()) {
            tracing::debug!(?existing, stream = ?stream.id(), target = ?sink.id(), "already connected");
            return existing;
        }

        let enabled = Rc::new(Cell::new(true));
        let handle = {
            let mut state = self.state.borrow_mut();
            let handle = ConnectionHandle(state.next_id);
            state.next_id += 1;
            state.connections.insert(
                handle,
                ConnectionEntry {
                    stream: stream.id(),
                    target: sink.id(),
                    enabled: Rc::clone(&enabled),
                    toggle: toggle.clone(),
                    subscription: Subscription::empty(),
                },
            );
            handle
        };

        let target = sink.clone();
        let subscription = stream.subscribe(move |value| {
            if !enabled.get() {
                tracing::trace!(?handle, "delivery suppressed by registry flag");
                return;
            }
            if let Some(toggle) = &toggle {
                if !toggle.is_enabled() {
                    tracing::trace!(?handle, "delivery suppressed by toggle");
                    return;
                }
            }
            target.write(value);
        });

        // The entry may have been removed re-entrantly during the replay.
        let orphan = {
            let mut state = self.state.borrow_mut();
            match state.connections.get_mut(&handle) {
                Some(entry) => {
                    entry.subscription = subscription;
                    None
                }
                None => Some(subscription),
            }
        };
        drop(orphan);

        tracing::debug!(?handle, stream = ?stream.id(), target = ?sink.id(), "connected");
        handle
    }

    /// Remove a connection. Returns false if it was already gone.
    pub fn disconnect(&self, handle: ConnectionHandle) -> bool {
        let entry = self.state.borrow_mut().connections.remove(&handle);
        match entry {
            Some(entry) => {
                // Unsubscribe outside the borrow.
                drop(entry);
                tracing::debug!(?handle, "disconnected");
                true
            }
            None => false,
        }
    }

    /// Remove every connection whose sink is `target`. Returns how many were removed.
    pub fn disconnect_target(&self, target: PropertyId) -> usize {
        let handles = self.connections_to(target);
        handles
            .into_iter()
            .filter(|handle| self.disconnect(*handle))
            .count()
    }

    /// Set the registry flag. Returns false for unknown handles.
    pub fn set_enabled(&self, handle: ConnectionHandle, enabled: bool) -> bool {
        let state = self.state.borrow();
        match state.connections.get(&handle) {
            Some(entry) => {
                entry.enabled.set(enabled);
                true
            }
            None => false,
        }
    }

    /// Whether the next emitted value would be applied, or None for unknown handles.
    pub fn is_enabled(&self, handle: ConnectionHandle) -> Option<bool> {
        let (flag, toggle) = {
            let state = self.state.borrow();
            let entry = state.connections.get(&handle)?;
            (entry.enabled.get(), entry.toggle.clone())
        };
        Some(flag && toggle.is_none_or(|toggle| toggle.is_enabled()))
    }

    pub fn is_connected(&self, handle: ConnectionHandle) -> bool {
        self.state.borrow().connections.contains_key(&handle)
    }

    /// Handles of every connection into `target`, oldest first.
    pub fn connections_to(&self, target: PropertyId) -> Vec<ConnectionHandle> {
        let state = self.state.borrow();
        let mut handles: Vec<ConnectionHandle> = state
            .connections
            .iter()
            .filter(|(_, entry)| entry.target == target)
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort();
        handles
    }

    pub fn len(&self) -> usize {
        self.state.borrow().connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every connection.
    pub fn clear(&self) {
        let entries: Vec<ConnectionEntry> = self
            .state
            .borrow_mut()
            .connections
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        drop(entries);
    }

    fn find(&self, stream: StreamId, target: PropertyId) -> Option<ConnectionHandle> {
        self.state
            .borrow()
            .connections
            .iter()
            .find(|(_, entry)| entry.stream == stream && entry.target == target)
            .map(|(handle, _)| *handle)
    }
}

// =============================================================================
// TESTS
// =============================================================================
