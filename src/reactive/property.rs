//! ReactiveProperty - Observable mutable cell
//!
//! A shared value cell whose writes notify subscribers synchronously, in
//! registration order, before the write returns.
//!
//! # API
//!
//! - `read()` - Current value, no side effects
//! - `write(value)` - Update, run the interceptor, notify subscribers
//! - `refresh(value)` - Update from the host side, notify without intercepting
//! - `subscribe(fn)` - Listen; the current value is replayed immediately
//! - `unsubscribe(handle)` - Stop listening (idempotent)
//!
//! # Example
//!
//! ```ignore
//! use spark_motion::ReactiveProperty;
//!
//! let rotation = ReactiveProperty::with_interceptor(0.0, |radians| {
//!     layer.set_rotation(*radians);
//! });
//!
//! let handle = rotation.subscribe(|radians| println!("rotation = {radians}"));
//! rotation.write(1.5); // intercepted, then printed
//! rotation.unsubscribe(handle);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::stream::{Stream, Subscription};
use crate::types::PropertyId;

// =============================================================================
// TYPES
// =============================================================================

/// Listener callback (Rc so a notification pass can snapshot the list).
type Listener<T> = Rc<dyn Fn(&T)>;

/// Write interceptor, used to push written values into the host.
pub type Interceptor<T> = Box<dyn Fn(&T)>;

/// Identifies one subscription on one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    property: PropertyId,
    slot: u64,
}

impl SubscriptionHandle {
    /// The property this handle belongs to.
    pub fn property(&self) -> PropertyId {
        self.property
    }
}

struct PropertyInner<T> {
    id: PropertyId,
    value: RefCell<T>,
    interceptor: Option<Interceptor<T>>,
    listeners: RefCell<Vec<(u64, Listener<T>)>>,
    next_slot: Cell<u64>,
    /// Set while the outermost write delivers.
    notifying: Cell<bool>,
    /// Values written from inside a notification pass, in write order.
    pending: RefCell<VecDeque<T>>,
}

/// An observable, mutable value cell.
///
/// Cloning a `ReactiveProperty` creates a new handle to the **same** cell.
pub struct ReactiveProperty<T> {
    inner: Rc<PropertyInner<T>>,
}

impl<T> Clone for ReactiveProperty<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReactiveProperty<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveProperty")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.borrow())
            .field("subscribers", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<T: Clone + Default + 'static> Default for ReactiveProperty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// =============================================================================
// IMPLEMENTATION
// =============================================================================

impl<T: Clone + 'static> ReactiveProperty<T> {
    /// Create a property holding `initial`.
    pub fn new(initial: T) -> Self {
        Self::build(initial, None)
    }

    /// Create a property whose writes are also forwarded to `interceptor`.
    ///
    /// The interceptor runs after the value is stored and before subscribers
    /// are notified. It does not run for [`refresh`](Self::refresh).
    pub fn with_interceptor(initial: T, interceptor: impl Fn(&T) + 'static) -> Self {
        Self::build(initial, Some(Box::new(interceptor)))
    }

    fn build(initial: T, interceptor: Option<Interceptor<T>>) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                id: PropertyId::next(),
                value: RefCell::new(initial),
                interceptor,
                listeners: RefCell::new(Vec::new()),
                next_slot: Cell::new(0),
                notifying: Cell::new(false),
                pending: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn id(&self) -> PropertyId {
        self.inner.id
    }

    /// Get the current value.
    pub fn read(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Store a value, run the interceptor, then notify every subscriber.
    pub fn write(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        if let Some(interceptor) = &self.inner.interceptor {
            interceptor(&value);
        }
        self.notify(&value);
    }

    /// Store a value that originated on the host side and notify subscribers.
    pub fn refresh(&self, value: T) {
        *self.inner.value.borrow_mut() = value.clone();
        self.notify(&value);
    }

    /// Register a listener. The current value is delivered before this returns.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> SubscriptionHandle {
        let slot = self.inner.next_slot.get();
        self.inner.next_slot.set(slot + 1);

        let listener: Listener<T> = Rc::new(listener);
        self.inner
            .listeners
            .borrow_mut()
            .push((slot, Rc::clone(&listener)));

        // Replay-one
        let current = self.read();
        listener(&current);

        SubscriptionHandle {
            property: self.inner.id,
            slot,
        }
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        if handle.property != self.inner.id {
            return false;
        }
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(slot, _)| *slot != handle.slot);
        listeners.len() != before
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// A stream of this property's values, starting with the current one.
    pub fn stream(&self) -> Stream<T> {
        let source = self.clone();
        Stream::new(move |observer| {
            let handle = source.subscribe(move |value: &T| observer(value.clone()));
            let source = source.clone();
            Subscription::new(move || {
                source.unsubscribe(handle);
            })
        })
    }

    /// Check if two handles point to the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn is_subscribed(&self, slot: u64) -> bool {
        self.inner
            .listeners
            .borrow()
            .iter()
            .any(|(existing, _)| *existing == slot)
    }

    /// Deliver `value` to every subscriber.
    ///
    /// A write made by a subscriber is queued and delivered after the current
    /// pass, so every subscriber sees values in write order and ends on the
    /// stored one.
    fn notify(&self, value: &T) {
        if self.inner.notifying.replace(true) {
            self.inner.pending.borrow_mut().push_back(value.clone());
            return;
        }

        self.deliver(value);
        loop {
            let next = self.inner.pending.borrow_mut().pop_front();
            match next {
                Some(next) => self.deliver(&next),
                None => break,
            }
        }
        self.inner.notifying.set(false);
    }

    fn deliver(&self, value: &T) {
        // Snapshot so listeners may subscribe, unsubscribe or write re-entrantly.
        let listeners: Vec<(u64, Listener<T>)> = self.inner.listeners.borrow().clone();
        for (slot, listener) in listeners {
            if self.is_subscribed(slot) {
                listener(value);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
