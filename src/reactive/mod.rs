//! Reactive primitives.
//!
//! - [`ReactiveProperty`] - Observable cell with synchronous, ordered,
//!   replay-one notification and optional write interception
//! - [`Stream`] - Lazy pipeline description, instantiated per subscription
//! - [`Toggle`] - Live boolean used to gate connections
//!
//! Everything here is single-threaded (`Rc`/`RefCell`) and never blocks.

mod gesture;
mod property;
mod stream;
mod toggle;

pub use property::*;
pub use stream::*;
pub use toggle::*;
