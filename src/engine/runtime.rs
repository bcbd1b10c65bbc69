//! Motion Runtime - Explicit context for a view tree
//!
//! Owns the reactive wrappers of every view and gesture recognizer it has
//! seen, the connection registry, the recognizer pool, and the installations
//! interactions leave behind. One runtime serves one view tree: create it when
//! motion is first applied, tear it down (or drop it) when the tree goes away.
//!
//! # API
//!
//! - `get(&view)` / `get(&recognizer)` - Reactive wrapper, created on first access
//! - `connect(stream, property)` - Live connection
//! - `connect_enabled_by(stream, property, toggle)` - Gated connection
//! - `connect_toggle(toggle, initial, apply)` - Drive a host flag from a reactive boolean
//! - `add(interaction, view, constraints)` / `remove(id)` - Install and uninstall
//! - `teardown_view(id)` / `teardown()` - Release everything for a view, or all views
//!
//! # Example
//!
//! ```ignore
//! let runtime = MotionRuntime::new();
//! let view = View::from_rc(HeadlessView::new(1));
//!
//! let rotatable = Rotatable::new();
//! runtime.add(&rotatable, &view, None);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use super::aggregate::AggregateState;
use super::connection::{ConnectionHandle, ConnectionRegistry};
use super::pool::{Checkin, GestureRecognizerPool, RecognizerHandle};
use crate::interactions::{Constraint, Interaction};
use crate::platform::{GestureRecognizer, View};
use crate::reactive::{ReactiveProperty, Stream, Toggle};
use crate::types::{GestureEvent, MotionState, RecognizerId, ViewId};

// =============================================================================
// REACTIVE WRAPPERS
// =============================================================================

/// Reactive properties of a view's layer.
#[derive(Clone, Debug)]
pub struct ReactiveLayer {
    rotation: ReactiveProperty<f64>,
}

impl ReactiveLayer {
    /// Rotation in radians. Writes are pushed into the host layer.
    pub fn rotation(&self) -> &ReactiveProperty<f64> {
        &self.rotation
    }
}

/// Reactive wrapper of a host view.
#[derive(Clone, Debug)]
pub struct ReactiveView {
    view: View,
    layer: ReactiveLayer,
}

impl ReactiveView {
    fn new(view: &View) -> Self {
        let host = view.clone();
        let rotation = ReactiveProperty::with_interceptor(view.host().rotation(), move |radians| {
            host.host().set_rotation(*radians);
        });
        Self {
            view: view.clone(),
            layer: ReactiveLayer { rotation },
        }
    }

    pub fn id(&self) -> ViewId {
        self.view.id()
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn layer(&self) -> &ReactiveLayer {
        &self.layer
    }
}

/// Reactive wrapper of a gesture recognizer.
#[derive(Clone, Debug)]
pub struct ReactiveGestureRecognizer {
    recognizer: GestureRecognizer,
}

impl ReactiveGestureRecognizer {
    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    /// Every event, starting with the most recent one.
    pub fn events(&self) -> Stream<GestureEvent> {
        self.recognizer.events()
    }

    /// Motion state implied by the recognition phase.
    pub fn state(&self) -> Stream<MotionState> {
        self.events().motion_state()
    }

    /// Absolute rotation for `property`, rebased at every `Began`.
    pub fn rotated_from(&self, property: &ReactiveProperty<f64>) -> Stream<f64> {
        self.events().rotated_from(property)
    }
}

/// Anything the runtime can hand back a reactive wrapper for.
pub trait Resolve {
    type Reactive;

    fn resolve(&self, runtime: &MotionRuntime) -> Self::Reactive;
}

impl Resolve for View {
    type Reactive = ReactiveView;

    fn resolve(&self, runtime: &MotionRuntime) -> ReactiveView {
        if let Some(existing) = runtime.state.borrow().views.get(&self.id()) {
            return existing.clone();
        }
        let created = ReactiveView::new(self);
        runtime
            .state
            .borrow_mut()
            .views
            .entry(self.id())
            .or_insert(created)
            .clone()
    }
}

impl Resolve for GestureRecognizer {
    type Reactive = ReactiveGestureRecognizer;

    fn resolve(&self, runtime: &MotionRuntime) -> ReactiveGestureRecognizer {
        runtime
            .state
            .borrow_mut()
            .gestures
            .entry(self.id())
            .or_insert_with(|| ReactiveGestureRecognizer {
                recognizer: self.clone(),
            })
            .clone()
    }
}

// =============================================================================
// INSTALLATIONS
// =============================================================================

/// Identifies an interaction installed on a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstallationId(u64);

/// Resources an interaction acquired while being added to a view.
///
/// Released in reverse dependency order when the interaction is removed or
/// the view is torn down: connections, then aggregate sources, then pooled
/// recognizers.
#[derive(Debug)]
pub struct Installation {
    view: ViewId,
    connections: Vec<ConnectionHandle>,
    observed: Vec<(AggregateState, ConnectionHandle)>,
    recognizers: Vec<RecognizerHandle>,
}

impl Installation {
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            connections: Vec::new(),
            observed: Vec::new(),
            recognizers: Vec::new(),
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn track_connection(&mut self, handle: ConnectionHandle) {
        self.connections.push(handle);
    }

    pub fn track_observed(&mut self, aggregate: &AggregateState, handle: ConnectionHandle) {
        self.observed.push((aggregate.clone(), handle));
    }

    pub fn track_recognizer(&mut self, handle: RecognizerHandle) {
        self.recognizers.push(handle);
    }

    pub fn connections(&self) -> &[ConnectionHandle] {
        &self.connections
    }

    pub fn recognizers(&self) -> &[RecognizerHandle] {
        &self.recognizers
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

#[derive(Default)]
struct RuntimeState {
    views: HashMap<ViewId, ReactiveView>,
    gestures: HashMap<RecognizerId, ReactiveGestureRecognizer>,
    installations: HashMap<InstallationId, Installation>,
    next_installation: u64,
}

/// Registry of reactive wrappers, connections and installations for one view tree.
#[derive(Default)]
pub struct MotionRuntime {
    registry: ConnectionRegistry,
    pool: GestureRecognizerPool,
    state: RefCell<RuntimeState>,
}

impl fmt::Debug for MotionRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MotionRuntime")
            .field("views", &state.views.len())
            .field("gestures", &state.gestures.len())
            .field("installations", &state.installations.len())
            .field("connections", &self.registry.len())
            .field("recognizers", &self.pool.len())
            .finish()
    }
}

impl MotionRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reactive wrapper for a view or recognizer. Same wrapper on every call.
    pub fn get<R: Resolve>(&self, target: &R) -> R::Reactive {
        target.resolve(self)
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &GestureRecognizerPool {
        &self.pool
    }

    // -------------------------------------------------------------------------
    // Connections
    // -------------------------------------------------------------------------

    /// Push every value of `stream` into `property`.
    pub fn connect<T: Clone + 'static>(
        &self,
        stream: &Stream<T>,
        property: &ReactiveProperty<T>,
    ) -> ConnectionHandle {
        self.registry.connect(stream, property, None)
    }

    /// Like [`connect`](Self::connect), applying values only while `toggle` reads true.
    pub fn connect_enabled_by<T: Clone + 'static>(
        &self,
        stream: &Stream<T>,
        property: &ReactiveProperty<T>,
        toggle: Rc<dyn Toggle>,
    ) -> ConnectionHandle {
        self.registry.connect(stream, property, Some(toggle))
    }

    /// Drive a host flag from a reactive boolean.
    ///
    /// Creates a property seeded with `initial` whose writes call `apply`, and
    /// connects `toggle` to it. `apply` runs immediately with the toggle's
    /// current value, then on every change.
    pub fn connect_toggle(
        &self,
        toggle: &ReactiveProperty<bool>,
        initial: bool,
        apply: impl Fn(bool) + 'static,
    ) -> ConnectionHandle {
        let target = ReactiveProperty::with_interceptor(initial, move |enabled: &bool| apply(*enabled));
        self.registry.connect(&toggle.stream(), &target, None)
    }

    pub fn disconnect(&self, handle: ConnectionHandle) -> bool {
        self.registry.disconnect(handle)
    }

    pub fn set_enabled(&self, handle: ConnectionHandle, enabled: bool) -> bool {
        self.registry.set_enabled(handle, enabled)
    }

    // -------------------------------------------------------------------------
    // Interactions
    // -------------------------------------------------------------------------

    /// Install `interaction` on `view`.
    ///
    /// Returns None when the interaction declined to install, e.g. because the
    /// view refused a gesture recognizer.
    pub fn add<I: Interaction>(
        &self,
        interaction: &I,
        view: &View,
        constraints: Option<Constraint<I::Value>>,
    ) -> Option<InstallationId> {
        let Some(installation) = interaction.add(view, self, constraints) else {
            tracing::debug!(view = ?view.id(), "interaction not installed");
            return None;
        };

        let mut state = self.state.borrow_mut();
        let id = InstallationId(state.next_installation);
        state.next_installation += 1;
        state.installations.insert(id, installation);
        tracing::debug!(view = ?view.id(), installation = ?id, "interaction installed");
        Some(id)
    }

    /// Uninstall an interaction. Returns false if it was already removed.
    pub fn remove(&self, id: InstallationId) -> bool {
        let installation = self.state.borrow_mut().installations.remove(&id);
        match installation {
            Some(installation) => {
                self.release(installation);
                tracing::debug!(installation = ?id, "interaction removed");
                true
            }
            None => false,
        }
    }

    /// Installations currently on `view`.
    pub fn installations_on(&self, view: ViewId) -> Vec<InstallationId> {
        let mut ids: Vec<InstallationId> = self
            .state
            .borrow()
            .installations
            .iter()
            .filter(|(_, installation)| installation.view == view)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Release everything bound to a view that is going away.
    ///
    /// Recognizer wrappers not backed by a pooled recognizer are dropped too;
    /// `get` recreates them on demand.
    pub fn teardown_view(&self, view: ViewId) {
        for id in self.installations_on(view) {
            self.remove(id);
        }

        let reactive_view = self.state.borrow_mut().views.remove(&view);
        if let Some(reactive_view) = reactive_view {
            self.registry
                .disconnect_target(reactive_view.layer.rotation.id());
        }

        for recognizer in self.pool.release_view(view) {
            self.forget_gesture(recognizer.id());
        }
        let pool = &self.pool;
        self.state
            .borrow_mut()
            .gestures
            .retain(|id, _| pool.holds(*id));
        tracing::debug!(?view, "view torn down");
    }

    /// Release every connection, recognizer and wrapper.
    pub fn teardown(&self) {
        let installations: Vec<Installation> = self
            .state
            .borrow_mut()
            .installations
            .drain()
            .map(|(_, installation)| installation)
            .collect();
        for installation in installations {
            self.release(installation);
        }

        self.registry.clear();
        self.pool.clear();

        let mut state = self.state.borrow_mut();
        state.views.clear();
        state.gestures.clear();
    }

    pub fn view_count(&self) -> usize {
        self.state.borrow().views.len()
    }

    pub fn gesture_count(&self) -> usize {
        self.state.borrow().gestures.len()
    }

    pub fn installation_count(&self) -> usize {
        self.state.borrow().installations.len()
    }

    fn release(&self, installation: Installation) {
        for handle in &installation.connections {
            self.registry.disconnect(*handle);
        }
        for (aggregate, handle) in &installation.observed {
            aggregate.forget(&self.registry, *handle);
        }
        for handle in &installation.recognizers {
            if let Checkin::Discarded(recognizer) = self.pool.checkin(handle) {
                self.forget_gesture(recognizer.id());
            }
        }
    }

    fn forget_gesture(&self, id: RecognizerId) {
        self.state.borrow_mut().gestures.remove(&id);
    }
}

impl Drop for MotionRuntime {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessView, HostView};
    use crate::types::RecognizerKind;

    fn setup() -> (MotionRuntime, Rc<HeadlessView>, View) {
        let host = HeadlessView::new(1);
        let view = View::from_rc(host.clone());
        (MotionRuntime::new(), host, view)
    }

    #[test]
    fn test_get_view_is_idempotent() {
        let (runtime, _host, view) = setup();
        let first = runtime.get(&view);
        let second = runtime.get(&view);
        assert!(first.layer().rotation().ptr_eq(second.layer().rotation()));
        assert_eq!(runtime.view_count(), 1);
    }

    #[test]
    fn test_get_recognizer_is_idempotent() {
        let (runtime, _host, _view) = setup();
        let recognizer = GestureRecognizer::new(RecognizerKind::Rotation);
        let first = runtime.get(&recognizer);
        let second = runtime.get(&recognizer);
        assert!(first.recognizer().ptr_eq(second.recognizer()));
        assert_eq!(runtime.gesture_count(), 1);
    }

    #[test]
    fn test_layer_rotation_writes_reach_host() {
        let (runtime, host, view) = setup();
        let rotation = runtime.get(&view).layer().rotation().clone();
        rotation.write(0.75);
        assert_eq!(host.rotation_writes(), vec![0.75]);
    }

    #[test]
    fn test_layer_rotation_seeded_from_host() {
        let host = HeadlessView::new(9);
        host.set_rotation(0.5);
        let view = View::from_rc(host.clone());
        let runtime = MotionRuntime::new();
        assert_eq!(runtime.get(&view).layer().rotation().read(), 0.5);
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (runtime, host, view) = setup();
        let source = ReactiveProperty::new(0.1);
        let rotation = runtime.get(&view).layer().rotation().clone();

        let handle = runtime.connect(&source.stream(), &rotation);
        source.write(0.2);
        assert!(runtime.disconnect(handle));
        assert!(!runtime.disconnect(handle));
        source.write(0.3);

        assert_eq!(host.rotation_writes(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_connect_enabled_by_toggle() {
        let (runtime, _host, view) = setup();
        let source = ReactiveProperty::new(0.0);
        let enabled = ReactiveProperty::new(true);
        let rotation = runtime.get(&view).layer().rotation().clone();

        runtime.connect_enabled_by(&source.stream(), &rotation, Rc::new(enabled.clone()));
        enabled.write(false);
        source.write(1.0);
        assert_eq!(rotation.read(), 0.0);

        enabled.write(true);
        source.write(2.0);
        assert_eq!(rotation.read(), 2.0);
    }

    #[test]
    fn test_connect_toggle_applies_current_value() {
        let (runtime, _host, _view) = setup();
        let toggle = ReactiveProperty::new(false);
        let applied = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&applied);

        runtime.connect_toggle(&toggle, true, move |enabled| sink.borrow_mut().push(enabled));
        toggle.write(true);
        toggle.write(false);

        assert_eq!(*applied.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_teardown_view_releases_everything() {
        let (runtime, host, view) = setup();
        let source = ReactiveProperty::new(0.0);
        let rotation = runtime.get(&view).layer().rotation().clone();
        runtime.connect(&source.stream(), &rotation);

        let handle = runtime.pool().dequeue(&view, RecognizerKind::Rotation).unwrap();
        let recognizer = runtime.pool().recognizer(&handle).unwrap();
        runtime.get(&recognizer);

        runtime.teardown_view(view.id());

        assert_eq!(runtime.view_count(), 0);
        assert_eq!(runtime.gesture_count(), 0);
        assert!(runtime.registry().is_empty());
        assert!(runtime.pool().is_empty());
        assert_eq!(host.attached_count(), 0);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_teardown_view_drops_unpooled_wrappers() {
        let (runtime, _host, view) = setup();
        let other = View::from_rc(HeadlessView::new(2));
        let pooled = runtime.pool().dequeue(&other, RecognizerKind::Rotation).unwrap();
        let kept = runtime.pool().recognizer(&pooled).unwrap();
        runtime.get(&kept);
        runtime.get(&GestureRecognizer::new(RecognizerKind::Rotation));
        assert_eq!(runtime.gesture_count(), 2);

        runtime.teardown_view(view.id());

        assert_eq!(runtime.gesture_count(), 1);
        assert!(runtime.get(&kept).recognizer().ptr_eq(&kept));
        assert_eq!(runtime.gesture_count(), 1);
    }

    #[test]
    fn test_drop_tears_down() {
        let host = HeadlessView::new(1);
        let view = View::from_rc(host.clone());
        let source = ReactiveProperty::new(0.0);
        {
            let runtime = MotionRuntime::new();
            let rotation = runtime.get(&view).layer().rotation().clone();
            runtime.connect(&source.stream(), &rotation);
            runtime.pool().dequeue(&view, RecognizerKind::Rotation);
            assert_eq!(host.attached_count(), 1);
        }
        assert_eq!(host.attached_count(), 0);
        assert_eq!(source.subscriber_count(), 0);
    }
}
