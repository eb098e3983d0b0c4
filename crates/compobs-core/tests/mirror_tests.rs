#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{item, items};
use compobs_core::diff::{diff, Change, ChangeSet, Mirror, Snapshot};
use compobs_core::errors::{CompObsError, ExError, ExErrorKind};
use compobs_core::identity::{ItemKey, ItemPolicy};
use serde_json::Value;

fn mirror_of(values: Vec<Value>) -> Mirror<Value> {
    let policy = ItemPolicy::new();
    Mirror::from_snapshot(&Snapshot::capture(values, &policy).unwrap())
}

#[test]
fn test_mirror_follows_replace_scenario() {
    let previous = items(&[(1, "a"), (2, "b")]);
    let current = items(&[(2, "b"), (3, "c")]);
    let changes = diff(&previous, &current, &ItemPolicy::new()).unwrap();

    let mut mirror = mirror_of(previous);
    mirror.apply_all(&changes).unwrap();

    assert_eq!(mirror.into_items(), current);
}

#[test]
fn test_reapplying_additions_is_rejected() {
    let previous = items(&[(1, "a")]);
    let current = items(&[(1, "a"), (2, "b")]);
    let changes = diff(&previous, &current, &ItemPolicy::new()).unwrap();

    let mut mirror = mirror_of(previous);
    mirror.apply_all(&changes).unwrap();
    let err = mirror.apply_all(&changes).unwrap_err();

    assert_eq!(
        err,
        CompObsError::MirrorKeyExists {
            key: ItemKey::from(2)
        }
    );
    assert_eq!(mirror.len(), 2);
}

#[test]
fn test_reapplying_removals_is_rejected() {
    let previous = items(&[(1, "a"), (2, "b")]);
    let current = items(&[(2, "b")]);
    let changes = diff(&previous, &current, &ItemPolicy::new()).unwrap();

    let mut mirror = mirror_of(previous);
    mirror.apply_all(&changes).unwrap();
    let snapshot = mirror.clone();

    assert!(matches!(
        mirror.apply_all(&changes),
        Err(CompObsError::MirrorKeyNotFound { .. })
    ));
    assert_eq!(mirror, snapshot);
}

#[test]
fn test_changed_on_wrong_index_reports_actual() {
    let mut mirror = mirror_of(items(&[(1, "a"), (2, "b")]));
    let err = mirror
        .apply(&Change::Changed {
            key: ItemKey::from(2),
            index: 0,
            old: item(2, "b"),
            new: item(2, "B"),
        })
        .unwrap_err();

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::MirrorConflict);
    assert_eq!(ex.code(), "ERR_MIRROR_CONFLICT");
    assert_eq!(ex.index(), Some(0));
    assert!(ex.message().contains("found at index 1"));
}

#[test]
fn test_move_out_of_range_is_rejected() {
    let mut mirror = mirror_of(items(&[(1, "a"), (2, "b")]));
    let result = mirror.apply(&Change::Moved {
        key: ItemKey::from(1),
        from_index: 0,
        to_index: 2,
    });
    assert!(matches!(
        result,
        Err(CompObsError::MirrorIndexMismatch { actual: None, .. })
    ));
    assert_eq!(mirror.into_items(), items(&[(1, "a"), (2, "b")]));
}

#[test]
fn test_lookup_by_key() {
    let mirror = mirror_of(items(&[(1, "a"), (2, "b")]));
    assert_eq!(mirror.get(&ItemKey::from(2)), Some(&item(2, "b")));
    assert_eq!(mirror.get(&ItemKey::from(3)), None);
    assert_eq!(mirror.keys(), vec![&ItemKey::from(1), &ItemKey::from(2)]);
}

#[test]
fn test_empty_change_set_is_a_no_op() {
    let mut mirror = mirror_of(items(&[(1, "a")]));
    mirror.apply_all(&ChangeSet::default()).unwrap();
    assert_eq!(mirror.len(), 1);
}
