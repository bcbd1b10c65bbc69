//! Motion Engine - Connections, recognizer pooling, aggregate state.
//!
//! The engine manages the runtime's live data structures:
//! - ConnectionRegistry: Stream → property subscriptions, toggleable
//! - GestureRecognizerPool: One shared recognizer per (view, kind)
//! - AggregateState: Merged liveness over many state sources
//! - MotionRuntime: Explicit context composing the above for a view tree
//!
//! # Architecture
//!
//! ```text
//! Interaction::add
//!     └─ MotionRuntime ── get(view) ──────────► ReactiveView ── layer.rotation
//!          │            └ get(recognizer) ────► ReactiveGestureRecognizer
//!          ├─ GestureRecognizerPool (dequeue / release)
//!          └─ ConnectionRegistry ── stream ──► ReactiveProperty
//! ```
//!
//! Everything is single-threaded and synchronous: a value emitted upstream
//! has reached its sink and every sink subscriber before the emit returns.

mod aggregate;
mod connection;
mod pool;
mod runtime;

pub use aggregate::*;
pub use connection::*;
pub use pool::*;
pub use runtime::*;
