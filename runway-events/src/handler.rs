use std::fmt;
use std::rc::Rc;

type Callback<C, A> = dyn Fn(&C, &[A]);

/// A shared event handler.
///
/// Handlers are compared by identity: two clones of the same `Handler` are
/// equal, two handlers built from identical closures are not. This is what
/// lets [`EventBus::off`](crate::EventBus::off) remove exactly the
/// registrations made with a given handle.
///
/// The first callback parameter is the emitting instance, the second the
/// positional arguments passed to `trigger`.
pub struct Handler<C: ?Sized, A = serde_json::Value>(Rc<Callback<C, A>>);

impl<C: ?Sized, A> Handler<C, A> {
    /// Wraps a closure into a handler.
    pub fn new(callback: impl Fn(&C, &[A]) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invokes the handler.
    pub fn call(&self, target: &C, args: &[A]) {
        (self.0)(target, args);
    }

    /// Returns true if both handles refer to the same handler.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

// Manual Clone: shares the same Rc without requiring `C: Clone`.
impl<C: ?Sized, A> Clone for Handler<C, A> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<C: ?Sized, A> PartialEq for Handler<C, A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<C: ?Sized, A> Eq for Handler<C, A> {}

impl<C: ?Sized, A> fmt::Debug for Handler<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}
