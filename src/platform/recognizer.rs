//! GestureRecognizer - Host recognizer object
//!
//! The host gesture subsystem owns recognition; this type is the runtime's
//! view of one recognizer: its kind, enablement, and the events it delivers.
//!
//! Hosts feed events with [`GestureRecognizer::deliver`]. Enablement can only
//! be changed through the [`GestureRecognizerPool`](crate::GestureRecognizerPool).

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::reactive::{ReactiveProperty, Stream};
use crate::types::{GestureEvent, GesturePhase, RecognizerId, RecognizerKind};

struct RecognizerInner {
    id: RecognizerId,
    kind: RecognizerKind,
    enabled: Cell<bool>,
    events: ReactiveProperty<GestureEvent>,
}

/// Shared handle to a host gesture recognizer.
#[derive(Clone)]
pub struct GestureRecognizer {
    inner: Rc<RecognizerInner>,
}

impl fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("enabled", &self.inner.enabled.get())
            .field("last", &self.inner.events.read())
            .finish()
    }
}

impl GestureRecognizer {
    /// Create an enabled recognizer in the `Possible` phase.
    pub fn new(kind: RecognizerKind) -> Self {
        Self {
            inner: Rc::new(RecognizerInner {
                id: RecognizerId::next(),
                kind,
                enabled: Cell::new(true),
                events: ReactiveProperty::new(GestureEvent::default()),
            }),
        }
    }

    pub fn id(&self) -> RecognizerId {
        self.inner.id
    }

    pub fn kind(&self) -> RecognizerKind {
        self.inner.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Most recent event.
    pub fn last_event(&self) -> GestureEvent {
        self.inner.events.read()
    }

    /// Current recognition phase.
    pub fn phase(&self) -> GesturePhase {
        self.last_event().phase
    }

    /// Deliver an event from the host gesture subsystem.
    ///
    /// Ignored while the recognizer is disabled; returns whether it was accepted.
    pub fn deliver(&self, event: GestureEvent) -> bool {
        if !self.is_enabled() {
            tracing::trace!(recognizer = ?self.inner.id, ?event, "event ignored, recognizer disabled");
            return false;
        }
        self.inner.events.write(event);
        true
    }

    /// Events as a stream, starting with the most recent one.
    pub fn events(&self) -> Stream<GestureEvent> {
        self.inner.events.stream()
    }

    /// Check if two handles refer to the same recognizer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Disabling mid-gesture cancels it, as host recognizers do.
    pub(crate) fn set_enabled(&self, enabled: bool) {
        if self.inner.enabled.replace(enabled) == enabled {
            return;
        }
        let last = self.last_event();
        if !enabled && last.phase.is_active() {
            self.inner.events.write(GestureEvent::cancelled(last.rotation));
        }
    }
}
