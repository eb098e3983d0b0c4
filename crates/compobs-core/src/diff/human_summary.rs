//! Human-readable summary renderer for change sets.

use crate::diff::model::{Change, ChangeKind, ChangeSet};

/// Render a short Markdown summary of a [`ChangeSet`].
///
/// Intended for logs and debugging output. Informational only.
pub fn render_summary<T>(changes: &ChangeSet<T>) -> String {
    let mut out = String::new();
    out.push_str("## Change Summary\n\n");

    if changes.is_empty() {
        out.push_str("_No changes._\n");
        return out;
    }

    let counts = changes.counts();
    out.push_str(&format!(
        "**Total**: {} (removed {}, changed {}, moved {}, added {})\n\n",
        counts.total(),
        counts.removed,
        counts.changed,
        counts.moved,
        counts.added
    ));

    for kind in [
        ChangeKind::Removed,
        ChangeKind::Changed,
        ChangeKind::Moved,
        ChangeKind::Added,
    ] {
        let lines: Vec<String> = changes
            .iter()
            .filter(|c| c.kind() == kind)
            .map(describe)
            .collect();
        if lines.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", heading(kind)));
        for line in lines {
            out.push_str(&format!("- {}\n", line));
        }
        out.push('\n');
    }

    out
}

fn heading(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Removed => "Removed",
        ChangeKind::Changed => "Changed",
        ChangeKind::Moved => "Moved",
        ChangeKind::Added => "Added",
    }
}

fn describe<T>(change: &Change<T>) -> String {
    match change {
        Change::Removed { key, index } => format!("`{}` at {}", key, index),
        Change::Changed { key, index, .. } => format!("`{}` at {}", key, index),
        Change::Moved {
            key,
            from_index,
            to_index,
        } => format!("`{}` {} → {}", key, from_index, to_index),
        Change::Added { key, index, .. } => format!("`{}` at {}", key, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ItemKey;

    #[test]
    fn test_empty_summary() {
        let changes: ChangeSet<i32> = ChangeSet::default();
        assert!(render_summary(&changes).contains("_No changes._"));
    }

    #[test]
    fn test_summary_groups_by_kind() {
        let changes: ChangeSet<i32> = ChangeSet::from_ordered(vec![
            Change::Removed {
                key: ItemKey::from(1),
                index: 0,
            },
            Change::Added {
                key: ItemKey::from(3),
                index: 1,
                item: 3,
            },
        ]);
        let summary = render_summary(&changes);
        assert!(summary.contains("**Total**: 2 (removed 1, changed 0, moved 0, added 1)"));
        assert!(summary.contains("### Removed\n\n- `1` at 0"));
        assert!(summary.contains("### Added\n\n- `3` at 1"));
        assert!(!summary.contains("### Moved"));
    }
}
