//! Rotatable - Rotate a view with a rotation gesture
//!
//! Affects the view's layer rotation. While the gesture is active the layer
//! follows `rotation at Began + gesture rotation`, after any constraints.
//!
//! # Example
//!
//! ```ignore
//! let rotatable = Rotatable::new();
//! runtime.add(&rotatable, &view, Some(constraint(|s: Stream<f64>| s.clamp(-1.0, 1.0))));
//!
//! rotatable.enabled().write(false); // cancels an active gesture
//! ```

use std::rc::Rc;

use super::gesturable::{Gesturable, GesturableConfig};
use super::{Constraint, Interaction, Stateful, Togglable};
use crate::engine::{AggregateState, Installation, MotionRuntime};
use crate::platform::{GestureRecognizer, View};
use crate::reactive::ReactiveProperty;
use crate::types::RecognizerKind;

#[derive(Debug, Clone)]
pub struct Rotatable {
    gesturable: Gesturable,
}

impl Default for Rotatable {
    fn default() -> Self {
        Self::new()
    }
}

impl Rotatable {
    /// Use the view's pooled rotation recognizer.
    pub fn new() -> Self {
        Self::with_config(GesturableConfig::RegisterNew)
    }

    /// Use `recognizer` instead of a pooled one.
    pub fn with_existing(recognizer: GestureRecognizer) -> Self {
        Self::with_config(GesturableConfig::WithExisting(recognizer))
    }

    pub fn with_config(config: GesturableConfig) -> Self {
        Self {
            gesturable: Gesturable::new(RecognizerKind::Rotation, config),
        }
    }

    pub fn gesturable(&self) -> &Gesturable {
        &self.gesturable
    }
}

impl Togglable for Rotatable {
    fn enabled(&self) -> &ReactiveProperty<bool> {
        self.gesturable.enabled()
    }
}

impl Stateful for Rotatable {
    fn state(&self) -> &AggregateState {
        self.gesturable.state()
    }
}

impl Interaction for Rotatable {
    type Value = f64;

    fn add(
        &self,
        view: &View,
        runtime: &MotionRuntime,
        constraints: Option<Constraint<f64>>,
    ) -> Option<Installation> {
        let reactive_view = runtime.get(view);
        let handle = self.gesturable.dequeue(view, runtime)?;
        let Some(recognizer) = runtime.pool().recognizer(&handle) else {
            runtime.pool().release(&handle);
            return None;
        };

        let mut installation = Installation::new(view.id());
        installation.track_recognizer(handle);
        let rotation = reactive_view.layer().rotation().clone();

        let pool = runtime.pool().clone();
        installation.track_connection(runtime.connect_toggle(
            self.enabled(),
            recognizer.is_enabled(),
            move |enabled| {
                pool.set_enabled(&handle, enabled);
            },
        ));

        let reactive_gesture = runtime.get(&recognizer);
        let observed = self.state().observe(reactive_gesture.state(), runtime.registry());
        installation.track_observed(self.state(), observed);

        let mut stream = reactive_gesture.rotated_from(&rotation);
        if let Some(apply) = constraints {
            stream = apply(stream);
        }
        // A shared recognizer can stay enabled for another holder.
        installation.track_connection(runtime.connect_enabled_by(
            &stream,
            &rotation,
            Rc::new(self.enabled().clone()),
        ));

        tracing::debug!(view = ?view.id(), recognizer = ?recognizer.id(), "rotatable added");
        Some(installation)
    }
}

// =============================================================================
// TESTS
// =============================================================================
