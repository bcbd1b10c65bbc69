//! HeadlessView - In-memory host view
//!
//! A [`HostView`] with no platform behind it. Records layer writes and
//! attached recognizers so interactions can be driven and inspected without a
//! windowing system.
//!
//! # Example
//!
//! ```ignore
//! let host = HeadlessView::new(1);
//! let view = View::from_rc(host.clone());
//! runtime.add(&Rotatable::new(), &view, None);
//! assert_eq!(host.attached_count(), 1);
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::recognizer::GestureRecognizer;
use super::view::HostView;
use crate::types::{RecognizerId, ViewId};

#[derive(Debug)]
pub struct HeadlessView {
    id: ViewId,
    rotation: Cell<f64>,
    accepting: Cell<bool>,
    attached: RefCell<Vec<RecognizerId>>,
    rotation_writes: RefCell<Vec<f64>>,
}

impl HeadlessView {
    pub fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id: ViewId(id),
            rotation: Cell::new(0.0),
            accepting: Cell::new(true),
            attached: RefCell::new(Vec::new()),
            rotation_writes: RefCell::new(Vec::new()),
        })
    }

    /// Stop accepting recognizers, as a view does while it is torn down.
    pub fn begin_teardown(&self) {
        self.accepting.set(false);
    }

    /// Recognizers currently attached, in attach order.
    pub fn attached(&self) -> Vec<RecognizerId> {
        self.attached.borrow().clone()
    }

    pub fn attached_count(&self) -> usize {
        self.attached.borrow().len()
    }

    /// Every rotation the runtime pushed into the layer.
    pub fn rotation_writes(&self) -> Vec<f64> {
        self.rotation_writes.borrow().clone()
    }
}

impl HostView for HeadlessView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn accepts_recognizers(&self) -> bool {
        self.accepting.get()
    }

    fn attach_recognizer(&self, recognizer: &GestureRecognizer) {
        let mut attached = self.attached.borrow_mut();
        if !attached.contains(&recognizer.id()) {
            attached.push(recognizer.id());
        }
    }

    fn detach_recognizer(&self, recognizer: &GestureRecognizer) {
        self.attached.borrow_mut().retain(|id| *id != recognizer.id());
    }

    fn rotation(&self) -> f64 {
        self.rotation.get()
    }

    fn set_rotation(&self, radians: f64) {
        self.rotation.set(radians);
        self.rotation_writes.borrow_mut().push(radians);
    }
}
