//! # spark-motion
//!
//! Reactive motion runtime for gesture-driven interactions.
//!
//! Interoperates with [spark-signals](https://github.com/RLabs-Inc/spark-signals):
//! a `Signal<bool>` can gate any connection.
//!
//! ## Architecture
//!
//! Interactions never mutate views directly. They ask a [`MotionRuntime`] for
//! reactive wrappers, build streams from gesture events, and connect those
//! streams to reactive properties whose writes reach the host layer:
//!
//! ```text
//! host events → GestureRecognizer → Stream stages → Connection → ReactiveProperty → host layer
//! ```
//!
//! Gesture recognizers are pooled per (view, kind), several interactions'
//! states merge into one [`AggregateState`], and a connection can be gated by
//! any [`Toggle`].
//!
//! ## Modules
//!
//! - [`types`] - Ids, gesture phases and events, motion state
//! - [`reactive`] - ReactiveProperty, Stream, Toggle
//! - [`engine`] - ConnectionRegistry, GestureRecognizerPool, AggregateState, MotionRuntime
//! - [`platform`] - Host view and recognizer interfaces, in-memory host
//! - [`interactions`] - Interaction trait, Gesturable, Rotatable

pub mod engine;
pub mod interactions;
pub mod platform;
pub mod reactive;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use engine::{
    AggregateState, ConnectionHandle, ConnectionRegistry, GestureRecognizerPool, Installation,
    InstallationId, MotionRuntime, ReactiveGestureRecognizer, ReactiveLayer, ReactiveView,
    RecognizerHandle, Resolve,
};

pub use reactive::{
    Interceptor, Observer, ReactiveProperty, Stream, Subscription, SubscriptionHandle, Toggle,
};

pub use platform::{GestureRecognizer, HeadlessView, HostView, View};

pub use interactions::{
    constraint, Constraint, Gesturable, GesturableConfig, Interaction, Rotatable, Stateful,
    Togglable,
};
