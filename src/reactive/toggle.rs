//! Toggle - Live boolean sources that gate connections.
//!
//! A connection keeps a reference to its toggle and reads it on every
//! delivery, so flipping the source takes effect with the next emitted value.
//!
//! Implemented for [`ReactiveProperty<bool>`], spark-signals'
//! [`Signal<bool>`], and plain `Cell<bool>`.

use std::cell::Cell;

use spark_signals::Signal;

use super::property::ReactiveProperty;

/// A boolean that can be read at any time.
pub trait Toggle {
    fn is_enabled(&self) -> bool;
}

impl Toggle for ReactiveProperty<bool> {
    fn is_enabled(&self) -> bool {
        self.read()
    }
}

impl Toggle for Signal<bool> {
    fn is_enabled(&self) -> bool {
        self.get()
    }
}

impl Toggle for Cell<bool> {
    fn is_enabled(&self) -> bool {
        self.get()
    }
}
