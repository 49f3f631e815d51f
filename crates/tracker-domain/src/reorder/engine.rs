use super::{BacklogEdge, OrdinalPatch, PersistStep, ReorderPlan};
use crate::issue::{Issue, IssueId};
use crate::partition::{ordinal_bounds, sorted_ids, PartitionKey};
use crate::scope::ScopeKey;

/// Insert `issue_id` into `others` at `index` (clamped to the end; `None` appends).
pub(crate) fn insert_at(mut others: Vec<IssueId>, issue_id: &str, index: Option<usize>) -> Vec<IssueId> {
    let at = index.unwrap_or(others.len()).min(others.len());
    others.insert(at, issue_id.to_string());
    others
}

/// Dense renumbering of `order`, with `moved` taking on `status`.
fn renumber(issues: &[Issue], order: &[IssueId], key: &PartitionKey) -> (Vec<Issue>, Vec<OrdinalPatch>) {
    let mut updated = Vec::with_capacity(order.len());
    let mut patches = Vec::with_capacity(order.len());

    for (ordinal, id) in order.iter().enumerate() {
        let Some(issue) = issues.iter().find(|issue| issue.id == *id) else {
            continue;
        };
        let mut issue = issue.clone();
        issue.ordinal = ordinal as i32;
        issue.status = key.status.clone();
        issue.sprint_id = key.sprint_id.clone();

        patches.push(OrdinalPatch {
            id: issue.id.clone(),
            ordinal: issue.ordinal,
            status: issue.status.clone(),
        });
        updated.push(issue);
    }

    (updated, patches)
}

/// Plan moving `issue_id` to position `index` of the `dest` partition.
///
/// Every member of each affected partition is renumbered `0..n-1`. Dropping
/// an issue back where it already is yields an empty plan.
pub fn plan_move(
    issues: &[Issue],
    issue_id: &str,
    dest: &PartitionKey,
    index: Option<usize>,
) -> ReorderPlan {
    let Some(moving) = issues.iter().find(|issue| issue.id == issue_id) else {
        tracing::debug!("Issue {} is not cached, nothing to move", issue_id);
        return ReorderPlan::noop(issue_id);
    };
    let source = PartitionKey::of(moving);

    if source == *dest {
        let current = sorted_ids(issues, &source);
        let others: Vec<IssueId> = current.iter().filter(|id| *id != issue_id).cloned().collect();
        let order = insert_at(others, issue_id, index);
        if order == current {
            return ReorderPlan::noop(issue_id);
        }

        let (updated, patches) = renumber(issues, &order, dest);
        return ReorderPlan {
            issue_id: issue_id.to_string(),
            updated,
            patches: patches.clone(),
            steps: vec![PersistStep::UpdateOrdinals {
                sprint_id: dest.sprint_id.clone(),
                patches,
            }],
            invalidated: vec![dest.scope()],
        };
    }

    let source_order: Vec<IssueId> = sorted_ids(issues, &source)
        .into_iter()
        .filter(|id| id != issue_id)
        .collect();
    let dest_order = insert_at(sorted_ids(issues, dest), issue_id, index);

    let (mut updated, mut patches) = renumber(issues, &source_order, &source);
    let (dest_updated, dest_patches) = renumber(issues, &dest_order, dest);
    updated.extend(dest_updated);
    patches.extend(dest_patches);

    let mut steps = Vec::new();
    if source.sprint_id != dest.sprint_id {
        match &dest.sprint_id {
            Some(sprint_id) => steps.push(PersistStep::MoveToSprint {
                issue_id: issue_id.to_string(),
                sprint_id: sprint_id.clone(),
                from_sprint_id: source.sprint_id.clone(),
                status: dest.status.clone(),
            }),
            None => steps.push(PersistStep::SendToBacklog {
                issue_id: issue_id.to_string(),
                from_sprint_id: source.sprint_id.clone(),
                edge: BacklogEdge::Bottom,
            }),
        }
    }
    steps.push(PersistStep::UpdateOrdinals {
        sprint_id: dest.sprint_id.clone(),
        patches: patches.clone(),
    });

    let mut invalidated = vec![source.scope()];
    if dest.scope() != source.scope() {
        invalidated.push(dest.scope());
    }

    ReorderPlan {
        issue_id: issue_id.to_string(),
        updated,
        patches,
        steps,
        invalidated,
    }
}

/// Plan sending an issue to the top or bottom of the backlog.
///
/// Only the moved issue changes: it takes `min - 1` or `max + 1` over the
/// whole backlog, every status included (0 when the backlog is empty).
pub fn plan_backlog_edge(issues: &[Issue], issue_id: &str, edge: BacklogEdge) -> ReorderPlan {
    let Some(moving) = issues.iter().find(|issue| issue.id == issue_id) else {
        tracing::debug!("Issue {} is not cached, nothing to send to backlog", issue_id);
        return ReorderPlan::noop(issue_id);
    };
    let bounds = ordinal_bounds(issues, Issue::is_backlog, Some(issue_id));

    if moving.is_backlog() {
        let already_there = match (bounds, edge) {
            (None, _) => true,
            (Some((min, _)), BacklogEdge::Top) => moving.ordinal < min,
            (Some((_, max)), BacklogEdge::Bottom) => moving.ordinal > max,
        };
        if already_there {
            return ReorderPlan::noop(issue_id);
        }
    }

    let ordinal = match (bounds, edge) {
        (None, _) => 0,
        (Some((min, _)), BacklogEdge::Top) => min - 1,
        (Some((_, max)), BacklogEdge::Bottom) => max + 1,
    };

    let mut issue = moving.clone();
    issue.sprint_id = None;
    issue.ordinal = ordinal;

    let mut invalidated = vec![ScopeKey::Backlog];
    if let Some(sprint_id) = &moving.sprint_id {
        invalidated.push(ScopeKey::Sprint(sprint_id.clone()));
    }

    ReorderPlan {
        issue_id: issue_id.to_string(),
        patches: vec![OrdinalPatch {
            id: issue.id.clone(),
            ordinal,
            status: issue.status.clone(),
        }],
        updated: vec![issue],
        steps: vec![PersistStep::SendToBacklog {
            issue_id: issue_id.to_string(),
            from_sprint_id: moving.sprint_id.clone(),
            edge,
        }],
        invalidated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::is_dense;
    use crate::EntityCache;

    fn issue(id: &str, status: &str, ordinal: i32) -> Issue {
        Issue::new(id, "p1", id, status, ordinal)
    }

    fn patch(id: &str, ordinal: i32, status: &str) -> OrdinalPatch {
        OrdinalPatch {
            id: id.to_string(),
            ordinal,
            status: status.to_string(),
        }
    }

    #[test]
    fn test_reorder_within_column() {
        let issues = vec![issue("I1", "TODO", 0), issue("I2", "TODO", 1), issue("I3", "TODO", 2)];
        let key = PartitionKey::backlog("TODO");

        let plan = plan_move(&issues, "I3", &key, Some(0));

        assert_eq!(
            plan.patches,
            vec![patch("I3", 0, "TODO"), patch("I1", 1, "TODO"), patch("I2", 2, "TODO")]
        );
        assert_eq!(plan.steps.len(), 1);

        let mut cache = EntityCache::with_issues(issues);
        plan.apply_to(&mut cache);
        assert_eq!(sorted_ids(cache.issues(), &key), vec!["I3", "I1", "I2"]);
    }

    #[test]
    fn test_drop_on_own_index_is_noop() {
        let issues = vec![issue("I1", "TODO", 0), issue("I2", "TODO", 1), issue("I3", "TODO", 2)];
        let key = PartitionKey::backlog("TODO");

        let plan = plan_move(&issues, "I2", &key, Some(1));

        assert!(plan.is_noop());
        assert!(plan.patches.is_empty());

        let mut cache = EntityCache::with_issues(issues.clone());
        plan.apply_to(&mut cache);
        assert_eq!(cache.issues(), issues.as_slice());
    }

    #[test]
    fn test_within_partition_renumbers_sparse_ordinals() {
        let issues = vec![issue("a", "TODO", 10), issue("b", "TODO", 20), issue("c", "TODO", 35)];
        let key = PartitionKey::backlog("TODO");

        let plan = plan_move(&issues, "a", &key, Some(2));

        let mut cache = EntityCache::with_issues(issues);
        plan.apply_to(&mut cache);
        assert!(is_dense(cache.issues(), &key));
        assert_eq!(sorted_ids(cache.issues(), &key), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_cross_partition_patches_both_sides() {
        let issues = vec![
            issue("a", "TODO", 0),
            issue("x", "TODO", 1),
            issue("b", "TODO", 2),
            issue("c", "DONE", 0),
            issue("d", "DONE", 1),
        ];
        let source = PartitionKey::backlog("TODO");
        let dest = PartitionKey::backlog("DONE");

        let plan = plan_move(&issues, "x", &dest, Some(1));

        assert_eq!(
            plan.patches,
            vec![
                patch("a", 0, "TODO"),
                patch("b", 1, "TODO"),
                patch("c", 0, "DONE"),
                patch("x", 1, "DONE"),
                patch("d", 2, "DONE"),
            ]
        );
        assert_eq!(plan.invalidated, vec![ScopeKey::Backlog]);
        assert!(matches!(plan.steps.as_slice(), [PersistStep::UpdateOrdinals { .. }]));

        let mut cache = EntityCache::with_issues(issues);
        plan.apply_to(&mut cache);
        assert!(is_dense(cache.issues(), &source));
        assert!(is_dense(cache.issues(), &dest));
        assert_eq!(cache.issue("x").unwrap().status, "DONE");
    }

    #[test]
    fn test_move_into_sprint_adds_move_step() {
        let issues = vec![issue("x", "TODO", 0), issue("s", "TODO", 0).in_sprint("s1")];
        let dest = PartitionKey::new("TODO", Some("s1".to_string()));

        let plan = plan_move(&issues, "x", &dest, None);

        assert_eq!(
            plan.steps[0],
            PersistStep::MoveToSprint {
                issue_id: "x".to_string(),
                sprint_id: "s1".to_string(),
                from_sprint_id: None,
                status: "TODO".to_string(),
            }
        );
        assert!(matches!(plan.steps[1], PersistStep::UpdateOrdinals { .. }));
        assert_eq!(
            plan.invalidated,
            vec![ScopeKey::Backlog, ScopeKey::Sprint("s1".to_string())]
        );
        let moved = plan.updated.iter().find(|i| i.id == "x").unwrap();
        assert_eq!(moved.sprint_id.as_deref(), Some("s1"));
        assert_eq!(moved.ordinal, 1);
    }

    #[test]
    fn test_move_out_of_sprint_sends_to_backlog() {
        let issues = vec![issue("x", "TODO", 0).in_sprint("s1")];
        let plan = plan_move(&issues, "x", &PartitionKey::backlog("TODO"), Some(0));
        assert!(matches!(
            &plan.steps[0],
            PersistStep::SendToBacklog { edge: BacklogEdge::Bottom, from_sprint_id: Some(s), .. } if s == "s1"
        ));
    }

    #[test]
    fn test_unknown_issue_is_noop() {
        let plan = plan_move(&[], "ghost", &PartitionKey::backlog("TODO"), None);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_bottom_of_backlog() {
        let issues = vec![
            issue("a", "TODO", 0),
            issue("b", "TODO", 3),
            issue("c", "TODO", 5),
            issue("x", "TODO", 1).in_sprint("s1"),
        ];

        let plan = plan_backlog_edge(&issues, "x", BacklogEdge::Bottom);

        assert_eq!(plan.updated.len(), 1);
        assert!(plan.updated[0].ordinal > 5);
        assert!(plan.updated[0].is_backlog());

        let mut cache = EntityCache::with_issues(issues.clone());
        plan.apply_to(&mut cache);
        for id in ["a", "b", "c"] {
            assert_eq!(cache.issue(id), issues.iter().find(|i| i.id == id));
        }
        assert_eq!(
            plan.invalidated,
            vec![ScopeKey::Backlog, ScopeKey::Sprint("s1".to_string())]
        );
    }

    #[test]
    fn test_top_of_backlog() {
        let issues = vec![issue("a", "TODO", -2), issue("b", "TODO", 4), issue("x", "TODO", 1)];
        let plan = plan_backlog_edge(&issues, "x", BacklogEdge::Top);
        assert_eq!(plan.patches, vec![patch("x", -3, "TODO")]);
    }

    #[test]
    fn test_backlog_edge_into_empty_partition() {
        let issues = vec![issue("x", "REVIEW", 7).in_sprint("s1")];
        let plan = plan_backlog_edge(&issues, "x", BacklogEdge::Top);
        assert_eq!(plan.updated[0].ordinal, 0);
    }

    #[test]
    fn test_bottom_of_backlog_spans_statuses() {
        let issues = vec![
            issue("a", "TODO", 0),
            issue("b", "DONE", 5),
            issue("x", "TODO", 1).in_sprint("s1"),
        ];

        let plan = plan_backlog_edge(&issues, "x", BacklogEdge::Bottom);
        assert_eq!(plan.patches, vec![patch("x", 6, "TODO")]);

        let mut cache = EntityCache::with_issues(issues);
        plan.apply_to(&mut cache);
        let order: Vec<_> = crate::projection::backlog_issues(&cache)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "x"]);
    }

    #[test]
    fn test_top_of_backlog_spans_statuses() {
        let issues = vec![issue("a", "DONE", -4), issue("b", "TODO", 2), issue("x", "TODO", 3)];
        let plan = plan_backlog_edge(&issues, "x", BacklogEdge::Top);
        assert_eq!(plan.patches, vec![patch("x", -5, "TODO")]);

        // Already below every other backlog issue, whatever its status.
        let issues = vec![issue("a", "DONE", 0), issue("x", "TODO", -1)];
        assert!(plan_backlog_edge(&issues, "x", BacklogEdge::Top).is_noop());
    }

    #[test]
    fn test_backlog_edge_already_there() {
        let issues = vec![issue("a", "TODO", 0), issue("x", "TODO", 9)];
        assert!(plan_backlog_edge(&issues, "x", BacklogEdge::Bottom).is_noop());
        assert!(!plan_backlog_edge(&issues, "x", BacklogEdge::Top).is_noop());
    }
}
