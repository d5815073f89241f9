#![allow(dead_code)]

use runway_model::{Observable, Subscription, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

/// Events seen by a recorder: the name it was registered under and the args.
pub type Log = Rc<RefCell<Vec<(String, Vec<Value>)>>>;

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Subscribes one recorder per name; the log keeps the dispatch order.
pub fn record<T>(target: &T, names: &[&str]) -> (Log, Vec<Subscription>)
where
    T: Observable<Arg = Value> + Clone + 'static,
{
    let log: Log = Rc::default();
    let subs = names
        .iter()
        .map(|name| {
            let log = Rc::clone(&log);
            let tag = (*name).to_owned();
            target.subscribe(name, move |_, args| {
                log.borrow_mut().push((tag.clone(), args.to_vec()));
            })
        })
        .collect();
    (log, subs)
}

/// Names of the recorded events, in order.
pub fn names(log: &Log) -> Vec<String> {
    log.borrow().iter().map(|(name, _)| name.clone()).collect()
}

/// Counts invocations of `names` on `target`.
pub fn count<T>(target: &T, names: &str) -> (Rc<Cell<usize>>, Subscription)
where
    T: Observable<Arg = Value> + Clone + 'static,
{
    let hits = Rc::new(Cell::new(0));
    let clone = Rc::clone(&hits);
    let sub = target.subscribe(names, move |_, _| clone.set(clone.get() + 1));
    (hits, sub)
}
