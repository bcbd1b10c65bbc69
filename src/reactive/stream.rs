//! Stream - Lazy, push-based event pipelines
//!
//! A [`Stream<T>`] is an immutable *description* of a pipeline. Nothing runs
//! until it is subscribed (directly, or through a connection). Every
//! subscription instantiates the pipeline afresh: stage state created by
//! [`Stream::stateful`] and friends is never shared between subscriptions.
//!
//! Combinators never mutate the receiver; each returns a new description with
//! its own [`StreamId`].
//!
//! # Example
//!
//! ```ignore
//! let doubled = property.stream().map(|x| x * 2).filter(|x| *x > 10);
//! let subscription = doubled.subscribe(|x| println!("{x}"));
//! drop(subscription); // stops listening
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::types::StreamId;

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Downstream callback.
pub type Observer<T> = Rc<dyn Fn(T)>;

/// A live subscription to a stream.
///
/// Unsubscribes when dropped or when [`unsubscribe`](Self::unsubscribe) is called.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription that runs `dispose` when released.
    pub fn new(dispose: impl FnOnce() + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to release.
    pub fn empty() -> Self {
        Self { dispose: None }
    }

    /// Release now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

// =============================================================================
// STREAM
// =============================================================================

type Producer<T> = dyn Fn(Observer<T>) -> Subscription;

/// A composable description of a sequence of values.
pub struct Stream<T> {
    id: StreamId,
    producer: Rc<Producer<T>>,
}

impl<T> Clone for Stream<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            producer: Rc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").field("id", &self.id).finish()
    }
}

impl<T: 'static> Stream<T> {
    /// Create a stream from a producer.
    ///
    /// The producer is called once per subscription with the downstream
    /// observer, and returns what must be released to stop the flow.
    pub fn new(producer: impl Fn(Observer<T>) -> Subscription + 'static) -> Self {
        Self {
            id: StreamId::next(),
            producer: Rc::new(producer),
        }
    }

    /// A stream that never emits.
    pub fn empty() -> Self {
        Self::new(|_| Subscription::empty())
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Instantiate the pipeline, delivering every value to `observer`.
    pub fn subscribe(&self, observer: impl Fn(T) + 'static) -> Subscription {
        (self.producer)(Rc::new(observer))
    }

    // -------------------------------------------------------------------------
    // Stateless stages
    // -------------------------------------------------------------------------

    /// Transform every value.
    pub fn map<U: 'static>(&self, transform: impl Fn(T) -> U + 'static) -> Stream<U> {
        let upstream = self.clone();
        let transform = Rc::new(transform);
        Stream::new(move |observer: Observer<U>| {
            let transform = Rc::clone(&transform);
            upstream.subscribe(move |value| observer(transform(value)))
        })
    }

    /// Forward only values matching `predicate`.
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Stream<T> {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Stream::new(move |observer: Observer<T>| {
            let predicate = Rc::clone(&predicate);
            upstream.subscribe(move |value| {
                if predicate(&value) {
                    observer(value);
                }
            })
        })
    }

    /// Observe values as they pass without changing them.
    pub fn inspect(&self, inspector: impl Fn(&T) + 'static) -> Stream<T> {
        let upstream = self.clone();
        let inspector = Rc::new(inspector);
        Stream::new(move |observer: Observer<T>| {
            let inspector = Rc::clone(&inspector);
            upstream.subscribe(move |value| {
                inspector(&value);
                observer(value);
            })
        })
    }

    // -------------------------------------------------------------------------
    // Stateful stages
    // -------------------------------------------------------------------------

    /// General stateful stage.
    ///
    /// `init` runs once per subscription. `step` receives the subscription's
    /// state and each upstream value, and emits when it returns `Some`.
    pub fn stateful<S: 'static, U: 'static>(
        &self,
        init: impl Fn() -> S + 'static,
        step: impl Fn(&mut S, T) -> Option<U> + 'static,
    ) -> Stream<U> {
        let upstream = self.clone();
        let step = Rc::new(step);
        Stream::new(move |observer: Observer<U>| {
            let state = RefCell::new(init());
            let step = Rc::clone(&step);
            upstream.subscribe(move |value| {
                // Release the state borrow before emitting downstream.
                let output = step(&mut state.borrow_mut(), value);
                if let Some(output) = output {
                    observer(output);
                }
            })
        })
    }

    /// Running accumulation, emitting the accumulator after every value.
    pub fn scan<A: Clone + 'static>(
        &self,
        seed: A,
        fold: impl Fn(&A, T) -> A + 'static,
    ) -> Stream<A> {
        self.stateful(
            move || seed.clone(),
            move |acc, value| {
                *acc = fold(acc, value);
                Some(acc.clone())
            },
        )
    }
}

impl<T: Clone + PartialEq + 'static> Stream<T> {
    /// Drop values equal to the previous one.
    pub fn dedupe(&self) -> Stream<T> {
        self.stateful(
            || None::<T>,
            |last, value| {
                if last.as_ref() == Some(&value) {
                    return None;
                }
                *last = Some(value.clone());
                Some(value)
            },
        )
    }
}

impl<T: Clone + 'static> Stream<T> {
    /// A stream that emits `values` synchronously on every subscription.
    pub fn from_values(values: Vec<T>) -> Self {
        Self::new(move |observer| {
            for value in values.iter().cloned() {
                observer(value);
            }
            Subscription::empty()
        })
    }
}

impl<T: PartialOrd + Copy + 'static> Stream<T> {
    /// Clamp every value into `[min, max]`.
    pub fn clamp(&self, min: T, max: T) -> Stream<T> {
        self.map(move |value| {
            if value < min {
                min
            } else if value > max {
                max
            } else {
                value
            }
        })
    }

    /// Forward only values at or above `min`.
    pub fn threshold_min(&self, min: T) -> Stream<T> {
        self.filter(move |value| *value >= min)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::property::ReactiveProperty;
    use std::cell::Cell;

    fn collect<T: 'static>(stream: &Stream<T>) -> (Rc<RefCell<Vec<T>>>, Subscription) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let subscription = stream.subscribe(move |value| sink.borrow_mut().push(value));
        (log, subscription)
    }

    #[test]
    fn test_lazy_until_subscribed() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let stream = Stream::new(move |observer: Observer<i32>| {
            calls_clone.set(calls_clone.get() + 1);
            observer(1);
            Subscription::empty()
        });
        let mapped = stream.map(|x| x + 1);

        assert_eq!(calls.get(), 0);
        let (log, _sub) = collect(&mapped);
        assert_eq!(calls.get(), 1);
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn test_combinators_return_new_descriptions() {
        let base = Stream::from_values(vec![1, 2, 3]);
        let mapped = base.map(|x| x * 10);
        let filtered = base.filter(|x| *x != 2);

        assert_ne!(base.id(), mapped.id());
        assert_ne!(base.id(), filtered.id());
        assert_eq!(base.id(), base.clone().id());

        let (original, _a) = collect(&base);
        let (tens, _b) = collect(&mapped);
        let (odd, _c) = collect(&filtered);
        assert_eq!(*original.borrow(), vec![1, 2, 3]);
        assert_eq!(*tens.borrow(), vec![10, 20, 30]);
        assert_eq!(*odd.borrow(), vec![1, 3]);
    }

    #[test]
    fn test_stateful_state_per_subscription() {
        let source = ReactiveProperty::new(1);
        let running = source.stream().scan(0, |acc, x| acc + x);

        let (first, _a) = collect(&running);
        source.write(2);
        let (second, _b) = collect(&running);
        source.write(3);

        assert_eq!(*first.borrow(), vec![1, 3, 6]);
        // Fresh accumulator: replay of 2, then 3.
        assert_eq!(*second.borrow(), vec![2, 5]);
    }

    #[test]
    fn test_dedupe() {
        let stream = Stream::from_values(vec![1, 1, 2, 2, 2, 1]).dedupe();
        let (log, _sub) = collect(&stream);
        assert_eq!(*log.borrow(), vec![1, 2, 1]);
    }

    #[test]
    fn test_clamp() {
        let stream = Stream::from_values(vec![-2.0, 0.5, 3.0]).clamp(0.0, 1.0);
        let (log, _sub) = collect(&stream);
        assert_eq!(*log.borrow(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_threshold_min() {
        let stream = Stream::from_values(vec![0.1, 0.5, 0.4, 0.9]).threshold_min(0.4);
        let (log, _sub) = collect(&stream);
        assert_eq!(*log.borrow(), vec![0.5, 0.4, 0.9]);
    }

    #[test]
    fn test_inspect_passes_through() {
        let seen = Rc::new(Cell::new(0));
        let seen_clone = Rc::clone(&seen);
        let stream = Stream::from_values(vec![4, 5]).inspect(move |_| seen_clone.set(seen_clone.get() + 1));
        let (log, _sub) = collect(&stream);
        assert_eq!(seen.get(), 2);
        assert_eq!(*log.borrow(), vec![4, 5]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let source = ReactiveProperty::new(0);
        let (log, subscription) = collect(&source.stream().map(|x| x + 100));
        source.write(1);
        subscription.unsubscribe();
        source.write(2);
        assert_eq!(*log.borrow(), vec![100, 101]);
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_empty_stream() {
        let (log, _sub) = collect(&Stream::<u8>::empty());
        assert!(log.borrow().is_empty());
    }
}
