//! Platform collaborators.
//!
//! - [`HostView`] / [`View`] - The host view and its layer
//! - [`GestureRecognizer`] - A host recognizer, fed by the gesture subsystem
//! - [`HeadlessView`] - In-memory host for tests and demos

mod headless;
mod recognizer;
mod view;

pub use headless::*;
pub use recognizer::*;
pub use view::*;
