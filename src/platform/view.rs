//! Host view interface.
//!
//! The runtime never touches a platform view directly. It reads and writes
//! layer properties and attaches recognizers through [`HostView`], held behind
//! a cloneable [`View`] handle.

use std::fmt;
use std::rc::Rc;

use super::recognizer::GestureRecognizer;
use crate::types::ViewId;

/// What the runtime needs from a platform view.
pub trait HostView {
    /// Stable identity.
    fn id(&self) -> ViewId;

    /// False while the view is being torn down.
    fn accepts_recognizers(&self) -> bool;

    fn attach_recognizer(&self, recognizer: &GestureRecognizer);

    fn detach_recognizer(&self, recognizer: &GestureRecognizer);

    /// Layer rotation in radians.
    fn rotation(&self) -> f64;

    fn set_rotation(&self, radians: f64);
}

/// Shared handle to a host view.
#[derive(Clone)]
pub struct View {
    host: Rc<dyn HostView>,
}

impl View {
    pub fn from_rc(host: Rc<dyn HostView>) -> Self {
        Self { host }
    }

    pub fn id(&self) -> ViewId {
        self.host.id()
    }

    pub fn host(&self) -> &dyn HostView {
        self.host.as_ref()
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View").field("id", &self.id()).finish()
    }
}
