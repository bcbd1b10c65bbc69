//! Interactions - Reusable behaviors installed on views
//!
//! An interaction resolves what it needs through the [`MotionRuntime`], wires
//! streams into view properties, and reports what it acquired as an
//! [`Installation`] so the runtime can release it later.
//!
//! - [`Rotatable`] - Rotation gesture → layer rotation
//! - [`Gesturable`] - Shared recognizer plumbing for gesture-driven interactions

mod gesturable;
mod rotatable;

pub use gesturable::*;
pub use rotatable::*;

use std::rc::Rc;

use crate::engine::{AggregateState, Installation, MotionRuntime};
use crate::platform::View;
use crate::reactive::{ReactiveProperty, Stream};

/// Stream transform applied once when an interaction builds its connection.
pub type Constraint<T> = Rc<dyn Fn(Stream<T>) -> Stream<T>>;

/// Wrap a closure as a [`Constraint`].
pub fn constraint<T: 'static>(transform: impl Fn(Stream<T>) -> Stream<T> + 'static) -> Constraint<T> {
    Rc::new(transform)
}

/// A behavior that can be added to a view.
pub trait Interaction {
    /// Value type constraints operate on.
    type Value: 'static;

    /// Wire the interaction into `view`.
    ///
    /// Returns None if it could not be installed; this is never fatal.
    fn add(
        &self,
        view: &View,
        runtime: &MotionRuntime,
        constraints: Option<Constraint<Self::Value>>,
    ) -> Option<Installation>;
}

/// An interaction that can be switched on and off at runtime.
pub trait Togglable {
    /// Reactive enablement, true by default.
    fn enabled(&self) -> &ReactiveProperty<bool>;
}

/// An interaction that reports whether it is in progress.
pub trait Stateful {
    /// Merged state across every view the interaction is installed on.
    fn state(&self) -> &AggregateState;
}
