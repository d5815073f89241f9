use crate::handler::Handler;
use std::fmt;

/// The `on` / `off` / `trigger` capability.
///
/// Implementors are cheap handles (`Clone` shares state) that own an
/// [`EventBus`](crate::EventBus) and pass themselves as the emitting
/// instance.
pub trait Observable {
    /// Positional argument type forwarded to handlers.
    type Arg;

    /// Registers `handler` once for each name in the space-separated list.
    fn on(&self, names: &str, handler: &Handler<Self, Self::Arg>);

    /// Removes every registration of `handler` under each listed name.
    fn off(&self, names: &str, handler: &Handler<Self, Self::Arg>);

    /// Triggers each listed name, walking the hierarchy of every name.
    fn trigger(&self, names: &str, args: &[Self::Arg]);

    /// Registers a closure and returns the handle needed to remove it.
    fn listen(
        &self,
        names: &str,
        callback: impl Fn(&Self, &[Self::Arg]) + 'static,
    ) -> Handler<Self, Self::Arg> {
        let handler = Handler::new(callback);
        self.on(names, &handler);
        handler
    }

    /// Registers a closure for as long as the returned guard lives.
    fn subscribe(
        &self,
        names: &str,
        callback: impl Fn(&Self, &[Self::Arg]) + 'static,
    ) -> Subscription
    where
        Self: Clone + Sized + 'static,
        Self::Arg: 'static,
    {
        let handler = self.listen(names, callback);
        let target = self.clone();
        let names = names.to_owned();
        Subscription::new(move || target.off(&names, &handler))
    }
}

/// RAII guard for a registered handler.
///
/// Dropping the guard (or calling [`cancel`](Self::cancel)) runs the detach
/// action exactly once.
#[must_use = "dropping a Subscription detaches its handler immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wraps a detach action.
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detaches now.
    pub fn cancel(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
