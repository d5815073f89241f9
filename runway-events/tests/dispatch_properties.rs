//! Property-based tests for hierarchical dispatch.
//!
//! For any colon-segmented name, triggering it must invoke the handlers of
//! every prefix exactly once, most specific first, and nothing else.

use proptest::prelude::*;
use runway_events::{EventBus, Handler};
use std::cell::RefCell;
use std::rc::Rc;

struct Source;

fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{1,6}").unwrap()
}

fn name_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 1..6)
}

proptest! {
    /// Every prefix level fires exactly once, in most-specific-first order.
    #[test]
    fn every_prefix_fires_once(segments in name_strategy(), arg in any::<i32>()) {
        let bus: EventBus<Source, i32> = EventBus::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let prefixes: Vec<String> = (1..=segments.len())
            .map(|n| segments[..n].join(":"))
            .collect();
        for prefix in &prefixes {
            let log = Rc::clone(&log);
            let tag = prefix.clone();
            bus.on(prefix, &Handler::new(move |_, args: &[i32]| {
                log.borrow_mut().push((tag.clone(), args.to_vec()));
            }));
        }

        let full = segments.join(":");
        bus.trigger(&Source, &full, &[arg]);

        let expected: Vec<(String, Vec<i32>)> = prefixes
            .iter()
            .rev()
            .map(|p| (p.clone(), vec![arg]))
            .collect();
        prop_assert_eq!(log.borrow().clone(), expected);
    }

    /// Registering under N names and triggering each once yields N calls.
    #[test]
    fn multi_name_registration_counts(names in prop::collection::hash_set(segment_strategy(), 1..8)) {
        let bus: EventBus<Source, i32> = EventBus::new();
        let calls = Rc::new(RefCell::new(0usize));
        let calls_clone = Rc::clone(&calls);
        let list = names.iter().cloned().collect::<Vec<_>>().join(" ");
        bus.on(&list, &Handler::new(move |_, _: &[i32]| *calls_clone.borrow_mut() += 1));

        for name in &names {
            bus.trigger(&Source, name, &[]);
        }

        prop_assert_eq!(*calls.borrow(), names.len());
    }

    /// on followed by off of the same handler leaves the bus empty.
    #[test]
    fn on_off_restores_empty_table(names in prop::collection::vec(segment_strategy(), 1..8), repeats in 1usize..4) {
        let bus: EventBus<Source, i32> = EventBus::new();
        let handler = Handler::new(|_: &Source, _: &[i32]| {});
        let list = names.join(" ");
        for _ in 0..repeats {
            bus.on(&list, &handler);
        }
        bus.off(&list, &handler);
        prop_assert!(bus.is_empty());
    }
}
