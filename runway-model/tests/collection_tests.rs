mod common;

use common::{count, init_tracing, names, record};
use pretty_assertions::assert_eq;
use runway_model::{Collection, CollectionDef, ElementType, Entity, EntityDef, Observable, Value};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn item() -> EntityDef {
    EntityDef::builder("Item").default("id", ()).build()
}

fn items(item: &EntityDef) -> CollectionDef {
    CollectionDef::builder("Items").element(item.clone()).build()
}

fn ids(list: &Collection) -> serde_json::Value {
    list.to_json().unwrap()
}

// ── Sequence ─────────────────────────────────────────────────────

#[test]
fn behaves_like_an_array() {
    init_tracing();
    let item = item();
    let items = items(&item);

    let list = items.construct(&[json!([{ "id": 1 }, { "id": 2 }]).into()]);
    list.add(json!({ "id": 3 }));
    let list2 = items.construct(&[json!([{ "id": 4 }]).into()]);
    list2.add(json!({ "id": 5 }));
    list2.add(json!({ "id": 6 }));

    assert_eq!(ids(&list), json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
    assert_eq!(ids(&list2), json!([{ "id": 4 }, { "id": 5 }, { "id": 6 }]));
    assert!(list.to_array().iter().all(|v| ElementType::from(item.clone()).is_instance(v)));
}

#[test]
fn accessors_reflect_contents() {
    let list = Collection::from_values([Value::from("a"), Value::from("b")]);

    assert_eq!(list.len(), 2);
    assert!(!list.is_empty());
    assert_eq!(list.get(1), Some(Value::from("b")));
    assert_eq!(list.get(2), None);
    assert_eq!(list.index_of(&Value::from("b")), Some(1));
    assert!(list.contains(&Value::from("a")));
    assert!(!list.contains(&Value::from("z")));
}

#[test]
fn untyped_collection_keeps_values_as_given() {
    let list = Collection::new();
    let entity = Entity::new();

    let stored = list.push(entity.clone());
    list.push(42);

    assert_eq!(stored, Value::from(entity));
    assert_eq!(list.to_array()[1], Value::from(42));
}

// ── Insertion events ─────────────────────────────────────────────

#[test]
fn add_triggers_add_then_change() {
    let item = item();
    let list = items(&item).new_default();
    let to_add = item.create(json!({ "id": "abc" }));
    let (log, _subs) = record(&list, &["add", "change"]);

    list.add(to_add.clone());

    assert_eq!(names(&log), vec!["add", "change"]);
    for (_, args) in log.borrow().iter() {
        assert_eq!(args, &vec![Value::from(to_add.clone())]);
    }
}

#[test]
fn initializer_sees_constructor_elements() {
    let item = item();
    let to_add = item.create(json!({ "id": "abc" }));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let clone = Rc::clone(&seen);
    let list_def = CollectionDef::builder("List")
        .element(item.clone())
        .initialize(move |list| {
            let clone = Rc::clone(&clone);
            list.listen("add change", move |_, args| clone.borrow_mut().push(args[0].clone()));
        })
        .build();

    let _list = list_def.construct(&[Value::from(Collection::from_values([Value::from(to_add.clone())]))]);

    assert_eq!(*seen.borrow(), vec![Value::from(to_add.clone()), Value::from(to_add)]);
}

#[test]
fn instances_pass_through_unconverted() {
    let item = item();
    let list = items(&item).new_default();
    let elem = item.create(json!({ "id": 1 }));

    let stored = list.push(elem.clone());

    assert_eq!(stored, Value::from(elem));
}

#[test]
fn other_values_are_constructed_as_elements() {
    let item = item();
    let list = items(&item).construct(&[json!([{}]).into()]);
    list.add_default();

    assert_eq!(ids(&list), json!([{ "id": null }, { "id": null }]));
}

#[test]
fn instance_of_other_definition_is_converted() {
    let item = item();
    let other = EntityDef::builder("Other").build();
    let list = items(&item).new_default();
    let foreign = other.create(json!({ "id": 9 }));

    let stored = list.push(foreign.clone());

    assert_ne!(stored, Value::from(foreign));
    assert_eq!(stored.to_json().unwrap(), json!({ "id": 9 }));
}

#[test]
fn untyped_add_default_pushes_null() {
    let list = Collection::new();

    assert!(list.add_default().is_null());
    assert_eq!(list.len(), 1);
}

// ── Removal ──────────────────────────────────────────────────────

#[test]
fn remove_drops_every_occurrence() {
    let item = item();
    let to_remove = item.create(json!({ "id": "abc" }));
    let list = items(&item).construct(&[Value::from(Collection::from_values([
        Value::from(json!({})),
        Value::from(to_remove.clone()),
        Value::from(to_remove.clone()),
        Value::from(json!({})),
    ]))]);

    let removed = list.remove(&Value::from(to_remove));

    assert_eq!(removed, 2);
    assert_eq!(ids(&list), json!([{ "id": null }, { "id": null }]));
}

#[test]
fn remove_triggers_per_occurrence() {
    let item = item();
    let to_remove = item.create(json!({ "id": "abc" }));
    let list = items(&item).create([
        Value::from(json!({})),
        Value::from(to_remove.clone()),
        Value::from(to_remove.clone()),
    ]);
    let (log, _subs) = record(&list, &["remove", "change"]);

    list.remove(&Value::from(to_remove.clone()));

    assert_eq!(names(&log), vec!["remove", "change", "remove", "change"]);
    for (_, args) in log.borrow().iter() {
        assert_eq!(args, &vec![Value::from(to_remove.clone())]);
    }
}

#[test]
fn remove_missing_value_is_silent() {
    let list = Collection::from_values([Value::from(1)]);
    let (hits, _sub) = count(&list, "*");

    assert_eq!(list.remove(&Value::from(2)), 0);
    assert_eq!(hits.get(), 0);
}

#[test]
fn push_and_pop_trigger_events() {
    let item = item();
    let list = items(&item).construct(&[json!([{}]).into()]);
    let elem = item.create(json!({ "id": "elem" }));
    let (log, _subs) = record(&list, &["add", "remove", "change"]);

    list.push(elem.clone());
    assert_eq!(list.to_array()[1], Value::from(elem.clone()));
    assert_eq!(list.pop(), Some(Value::from(elem.clone())));

    assert_eq!(ids(&list), json!([{ "id": null }]));
    assert_eq!(names(&log), vec!["add", "change", "remove", "change"]);
    for (_, args) in log.borrow().iter() {
        assert_eq!(args, &vec![Value::from(elem.clone())]);
    }
}

#[test]
fn shift_and_unshift_trigger_events() {
    let item = item();
    let list = items(&item).construct(&[json!([{}]).into()]);
    let elem = item.create(json!({ "id": "elem" }));
    let (log, _subs) = record(&list, &["add", "remove", "change"]);

    list.unshift(elem.clone());
    assert_eq!(list.to_array()[0], Value::from(elem.clone()));
    assert_eq!(list.shift(), Some(Value::from(elem)));

    assert_eq!(ids(&list), json!([{ "id": null }]));
    assert_eq!(names(&log), vec!["add", "change", "remove", "change"]);
}

#[test]
fn pop_and_shift_on_empty_are_silent() {
    let list = Collection::new();
    let (hits, _sub) = count(&list, "*");

    assert_eq!(list.pop(), None);
    assert_eq!(list.shift(), None);
    assert_eq!(hits.get(), 0);
}

// ── Reordering ───────────────────────────────────────────────────

#[test]
fn sort_and_reverse_trigger_events() {
    let item = item();
    let list = items(&item).construct(&[json!([{ "id": 1 }, { "id": 4 }, { "id": 2 }]).into()]);
    let (log, _subs) = record(&list, &["sort", "change"]);

    list.reverse();
    assert_eq!(ids(&list), json!([{ "id": 2 }, { "id": 4 }, { "id": 1 }]));

    list.sort_by_key(|v| v.as_entity().and_then(|e| e.get("id")).and_then(|id| id.as_i64()));
    assert_eq!(ids(&list), json!([{ "id": 1 }, { "id": 2 }, { "id": 4 }]));

    assert_eq!(names(&log), vec!["sort", "change", "sort", "change"]);
    assert!(log.borrow().iter().all(|(_, args)| args.is_empty()));
}

#[test]
fn sort_orders_by_text_form() {
    let list = Collection::from_values(
        [Value::from(10), Value::from("b"), Value::from(9), Value::from("a")],
    );
    let (log, _subs) = record(&list, &["sort", "change"]);

    list.sort();

    assert_eq!(ids(&list), json!([10, 9, "a", "b"]));
    assert_eq!(names(&log), vec!["sort", "change"]);
}

#[test]
fn sort_is_stable() {
    let list = Collection::from_values(
        [json!([1, "b"]), json!([0, "a"]), json!([1, "a"]), json!([0, "b"])].map(Value::from),
    );

    list.sort_by_key(|v| v.as_data().and_then(|d| d[0].as_i64()));

    assert_eq!(ids(&list), json!([[0, "a"], [0, "b"], [1, "b"], [1, "a"]]));
}

#[test]
fn comparator_may_read_the_collection() {
    let list = Collection::from_values([3, 1, 2].map(Value::from));
    let peek = list.clone();

    list.sort_by(|a, b| {
        assert_eq!(peek.len(), 3);
        a.as_i64().cmp(&b.as_i64())
    });

    assert_eq!(ids(&list), json!([1, 2, 3]));
}

// ── Splice ───────────────────────────────────────────────────────

#[test]
fn splice_replaces_range() {
    let list = Collection::from_values([1, 2, 3, 4].map(Value::from));
    let (log, _subs) = record(&list, &["add", "remove"]);

    let removed = list.splice(1, 2, [Value::from(9)]);

    assert_eq!(removed, vec![Value::from(2), Value::from(3)]);
    assert_eq!(ids(&list), json!([1, 9, 4]));
    assert_eq!(names(&log), vec!["remove", "remove", "add"]);
}

#[test]
fn splice_pairs_each_removal_and_insertion_with_change() {
    let list = Collection::from_values([1, 2, 3].map(Value::from));
    let (log, _subs) = record(&list, &["add", "remove", "change"]);

    list.splice(1, 1, [Value::from(9)]);

    assert_eq!(names(&log), vec!["remove", "change", "add", "change"]);
    let args: Vec<Vec<Value>> = log.borrow().iter().map(|(_, args)| args.clone()).collect();
    assert_eq!(
        args,
        vec![
            vec![Value::from(2)],
            vec![Value::from(2)],
            vec![Value::from(9)],
            vec![Value::from(9)],
        ]
    );
    assert_eq!(ids(&list), json!([1, 9, 3]));
}

#[test]
fn splice_applies_before_events() {
    let list = Collection::from_values([1, 2].map(Value::from));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let clone = Rc::clone(&seen);
    list.listen("remove", move |this, _| clone.borrow_mut().push(this.to_json().unwrap()));

    list.splice(0, 1, [Value::from(7), Value::from(8)]);

    assert_eq!(*seen.borrow(), vec![json!([7, 8, 2])]);
}

#[test]
fn splice_clamps_out_of_range() {
    let list = Collection::from_values([1, 2].map(Value::from));

    let removed = list.splice(5, 10, [Value::from(3)]);

    assert!(removed.is_empty());
    assert_eq!(ids(&list), json!([1, 2, 3]));
}

#[test]
fn splice_converts_inserted_values() {
    let item = item();
    let list = items(&item).new_default();

    list.splice(0, 0, [Value::from(json!({ "id": 1 }))]);

    assert!(list.get(0).unwrap().as_entity().unwrap().is_instance_of(&item));
}

// ── Preprocessing ────────────────────────────────────────────────

#[test]
fn constructor_args_preprocessed() {
    let list_def = CollectionDef::builder("Scaled")
        .preprocess(|args| {
            args.iter()
                .zip([2, 3, 4])
                .map(|(arg, factor)| Value::from(arg.as_i64().unwrap_or(0) * factor))
                .collect()
        })
        .build();

    let list = list_def.construct(&[1, 2, 3].map(Value::from));

    assert_eq!(ids(&list), json!([2, 6, 12]));
}

// ── Observation ──────────────────────────────────────────────────

#[test]
fn each_and_added_covers_current_and_future() {
    let item = item();
    let list = items(&item).construct(&[json!([{ "id": 50 }, { "id": 60 }, { "id": 70 }]).into()]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let clone = Rc::clone(&seen);

    let check = item.clone();
    let handler = list.each_and_added(move |_, value| {
        assert!(value.as_entity().unwrap().is_instance_of(&check));
        clone.borrow_mut().push(value.as_entity().unwrap().get("id").unwrap());
    });
    list.add(json!({ "id": 80 }));
    list.add(json!({ "id": 90 }));

    assert_eq!(seen.borrow().len(), 5);

    list.off("add", &handler);
    list.add(json!({ "id": 100 }));
    assert_eq!(seen.borrow().len(), 5);
}

#[test]
fn element_snapshot_of_nested_collections() {
    let item = item();
    let grid_def = CollectionDef::builder("Grid").element(items(&item)).build();

    let grid = grid_def.construct(&[json!([[{ "id": 1 }], []]).into()]);

    assert_eq!(grid.len(), 2);
    assert!(grid.get(1).unwrap().as_collection().unwrap().is_empty());
    assert_eq!(ids(&grid), json!([[{ "id": 1 }], []]));
}

#[test]
fn debug_names_definition_and_element() {
    let item = item();

    let text = format!("{:?}", items(&item).new_default());

    assert!(text.contains("Items"));
    assert!(text.contains("Item"));
}
