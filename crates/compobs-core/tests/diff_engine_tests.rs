#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{item, items};
use compobs_core::diff::{diff, render_summary, Change, ChangeKind, Mirror};
use compobs_core::errors::ExErrorKind;
use compobs_core::identity::{ItemKey, ItemPolicy, ObserveOptions};
use serde_json::{json, Value};

fn default_policy() -> ItemPolicy<Value> {
    ItemPolicy::new()
}

fn apply(previous: &[Value], current: &[Value]) -> Vec<Value> {
    let policy = default_policy();
    let changes = diff(previous, current, &policy).unwrap();
    let mut mirror = Mirror::new();
    for (index, value) in previous.iter().enumerate() {
        mirror
            .apply(&Change::Added {
                key: policy.key_at(value, index).unwrap(),
                index,
                item: value.clone(),
            })
            .unwrap();
    }
    mirror.apply_all(&changes).unwrap();
    mirror.into_items()
}

#[test]
fn test_scenario_replace_tail_item() {
    // [1, 2] -> [2, 3]: 1 leaves, 3 arrives, 2 keeps its relative order
    let previous = items(&[(1, "a"), (2, "b")]);
    let current = items(&[(2, "b"), (3, "c")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(
        changes.into_vec(),
        vec![
            Change::Removed {
                key: ItemKey::from(1),
                index: 0,
            },
            Change::Added {
                key: ItemKey::from(3),
                index: 1,
                item: item(3, "c"),
            },
        ]
    );
}

#[test]
fn test_scenario_content_change() {
    let previous = items(&[(1, "x")]);
    let current = items(&[(1, "x2")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(
        changes.into_vec(),
        vec![Change::Changed {
            key: ItemKey::from(1),
            index: 0,
            old: item(1, "x"),
            new: item(1, "x2"),
        }]
    );
}

#[test]
fn test_identical_snapshots_produce_nothing() {
    let snapshot = items(&[(1, "a"), (2, "b"), (3, "c")]);
    let changes = diff(&snapshot, &snapshot, &default_policy()).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_empty_to_items_is_all_added_in_order() {
    let current = items(&[(5, "a"), (6, "b"), (7, "c")]);
    let changes = diff(&[], &current, &default_policy()).unwrap();

    let added: Vec<(String, usize)> = changes
        .iter()
        .map(|c| match c {
            Change::Added { key, index, .. } => (key.to_string(), *index),
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    assert_eq!(
        added,
        vec![("5".to_string(), 0), ("6".to_string(), 1), ("7".to_string(), 2)]
    );
}

#[test]
fn test_items_to_empty_is_all_removed_at_front() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c")]);
    let changes = diff(&previous, &[], &default_policy()).unwrap();

    assert_eq!(changes.len(), 3);
    for change in &changes {
        assert_eq!(change.kind(), ChangeKind::Removed);
        assert!(matches!(change, Change::Removed { index: 0, .. }));
    }
}

#[test]
fn test_swap_reports_single_move() {
    let previous = items(&[(1, "a"), (2, "b")]);
    let current = items(&[(2, "b"), (1, "a")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(
        changes.into_vec(),
        vec![Change::Moved {
            key: ItemKey::from(1),
            from_index: 0,
            to_index: 1,
        }]
    );
}

#[test]
fn test_reversal_moves_all_but_one() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    let current: Vec<Value> = previous.iter().rev().cloned().collect();

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(changes.counts().moved, 3);
    assert_eq!(changes.len(), 3);
    assert_eq!(apply(&previous, &current), current);
}

#[test]
fn test_single_insertion_moves_nothing() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c")]);
    let current = items(&[(1, "a"), (9, "z"), (2, "b"), (3, "c")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(
        changes.into_vec(),
        vec![Change::Added {
            key: ItemKey::from(9),
            index: 1,
            item: item(9, "z"),
        }]
    );
}

#[test]
fn test_delivery_order_groups_kinds() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    let current = items(&[(4, "d"), (2, "B"), (5, "e"), (3, "c")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();
    let kinds: Vec<ChangeKind> = changes.iter().map(|c| c.kind()).collect();

    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
    assert_eq!(changes.counts().removed, 1);
    assert_eq!(changes.counts().changed, 1);
    assert_eq!(changes.counts().moved, 1);
    assert_eq!(changes.counts().added, 1);
    assert_eq!(apply(&previous, &current), current);
}

#[test]
fn test_changed_and_moved_item_reports_both() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c")]);
    let current = items(&[(3, "C"), (1, "a"), (2, "b")]);

    let changes = diff(&previous, &current, &default_policy()).unwrap();

    assert_eq!(
        changes.into_vec(),
        vec![
            Change::Changed {
                key: ItemKey::from(3),
                index: 2,
                old: item(3, "c"),
                new: item(3, "C"),
            },
            Change::Moved {
                key: ItemKey::from(3),
                from_index: 2,
                to_index: 0,
            },
        ]
    );
}

#[test]
fn test_custom_identity_and_equality() {
    let options = ObserveOptions::<Value>::new()
        .with_identity_field("sku")
        .with_equals(|a: &Value, b: &Value| a["version"] == b["version"]);
    let policy = ItemPolicy::from_options(options);

    let previous = vec![json!({ "sku": "A", "version": 1, "note": "x" })];
    let current = vec![json!({ "sku": "A", "version": 1, "note": "ignored" })];
    assert!(diff(&previous, &current, &policy).unwrap().is_empty());

    let bumped = vec![json!({ "sku": "A", "version": 2, "note": "x" })];
    let changes = diff(&previous, &bumped, &policy).unwrap();
    assert_eq!(changes.counts().changed, 1);
    assert_eq!(changes.as_slice()[0].key(), &ItemKey::from("A"));
}

#[test]
fn test_underscore_id_fallback() {
    let previous = vec![json!({ "_id": "x", "v": 1 })];
    let current = vec![json!({ "_id": "x", "v": 2 })];
    let changes = diff(&previous, &current, &default_policy()).unwrap();
    assert_eq!(changes.as_slice()[0].key(), &ItemKey::from("x"));
}

#[test]
fn test_missing_identity_is_configuration_error() {
    let current = vec![item(1, "a"), json!({ "v": "no id" })];
    let err = diff(&[], &current, &default_policy()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Configuration);
    assert_eq!(err.code(), "ERR_CONFIGURATION");
    assert_eq!(err.index(), Some(1));
    assert_eq!(err.op(), Some("diff"));
}

#[test]
fn test_duplicate_identity_is_rejected() {
    let current = items(&[(1, "a"), (2, "b"), (1, "c")]);
    let err = diff(&[], &current, &default_policy()).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::DuplicateIdentity);
    assert_eq!(err.key(), Some(&ItemKey::from(1)));
    assert_eq!(err.index(), Some(2));
}

#[test]
fn test_int_and_string_keys_do_not_collide() {
    let previous = vec![json!({ "id": 1 })];
    let current = vec![json!({ "id": "1" })];
    let changes = diff(&previous, &current, &default_policy()).unwrap();
    assert_eq!(changes.counts().removed, 1);
    assert_eq!(changes.counts().added, 1);
}

#[test]
fn test_diff_is_deterministic() {
    let previous = items(&[(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e")]);
    let current = items(&[(5, "e"), (3, "c"), (6, "f"), (1, "A"), (2, "b")]);
    let first = diff(&previous, &current, &default_policy()).unwrap();
    let second = diff(&previous, &current, &default_policy()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_change_set_serializes_with_op_tags() {
    let previous = items(&[(1, "a")]);
    let current = items(&[(2, "b")]);
    let changes = diff(&previous, &current, &default_policy()).unwrap();

    let json = serde_json::to_value(&changes).unwrap();
    assert_eq!(json[0]["op"], "removed");
    assert_eq!(json[1]["op"], "added");
    assert_eq!(json[1]["index"], 0);
}

#[test]
fn test_summary_lists_operations() {
    let previous = items(&[(1, "a"), (2, "b")]);
    let current = items(&[(2, "b"), (3, "c")]);
    let changes = diff(&previous, &current, &default_policy()).unwrap();

    let summary = render_summary(&changes);
    assert!(summary.contains("**Total**: 2"));
    assert!(summary.contains("- `1` at 0"));
    assert!(summary.contains("- `3` at 1"));
}
