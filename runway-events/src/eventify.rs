//! Observable capability for arbitrary values.

use crate::bus::EventBus;
use crate::handler::Handler;
use crate::observable::Observable;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

struct Inner<T, A> {
    value: T,
    bus: EventBus<Eventified<T, A>, A>,
}

/// A value with its own event bus.
///
/// Derefs to the wrapped value; use interior mutability (`Cell`, `RefCell`)
/// in `T` when handlers need to mutate it. Cloning shares both the value
/// and the listener table.
pub struct Eventified<T, A = serde_json::Value> {
    inner: Rc<Inner<T, A>>,
}

/// Attaches the [`Observable`] capability to `value`.
pub fn eventify<T, A>(value: T) -> Eventified<T, A> {
    Eventified {
        inner: Rc::new(Inner {
            value,
            bus: EventBus::new(),
        }),
    }
}

impl<T, A> Eventified<T, A> {
    /// The wrapped value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.inner.value
    }

    /// The listener table.
    #[must_use]
    pub fn bus(&self) -> &EventBus<Self, A> {
        &self.inner.bus
    }

    /// Returns true if both handles share the same value and bus.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T, A> Observable for Eventified<T, A> {
    type Arg = A;

    fn on(&self, names: &str, handler: &Handler<Self, A>) {
        self.inner.bus.on(names, handler);
    }

    fn off(&self, names: &str, handler: &Handler<Self, A>) {
        self.inner.bus.off(names, handler);
    }

    fn trigger(&self, names: &str, args: &[A]) {
        self.inner.bus.trigger(self, names, args);
    }
}

impl<T, A> Deref for Eventified<T, A> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T, A> Clone for Eventified<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug, A> fmt::Debug for Eventified<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eventified")
            .field("value", &self.inner.value)
            .field("bus", &self.inner.bus)
            .finish()
    }
}
