use crate::cli::{BacklogArgs, MoveArgs};
use crate::context::CliContext;
use crate::output::{self, FailureKind};
use tracker_domain::{
    plan_backlog_edge, BacklogEdge, DropTarget, GestureEffect, GestureEvent, GestureState,
    PartitionKey, ReorderPlan,
};

/// Replays the move as a drag gesture so the same rules apply as on a board.
pub async fn handle_move(ctx: &mut CliContext, args: MoveArgs) -> anyhow::Result<()> {
    let Some(issue) = ctx.cache().issue(&args.issue).cloned() else {
        output::output_failure(FailureKind::NotFound, format!("Issue not found: {}", args.issue));
    };

    let status = args.status.unwrap_or_else(|| issue.status.clone());
    let sprint_id = if args.backlog {
        None
    } else {
        args.sprint.or_else(|| issue.sprint_id.clone())
    };
    let key = PartitionKey::new(status, sprint_id);

    let issues = ctx.issues().to_vec();
    let (state, _) = GestureState::Idle.handle(
        GestureEvent::DragStart {
            issue_id: issue.id.clone(),
        },
        &issues,
        ctx.board(),
    );
    if !state.is_dragging() {
        output::output_failure(
            FailureKind::Validation,
            format!(
                "Issue {} has status {} which is not on board {}",
                issue.id,
                issue.status,
                ctx.board().id
            ),
        );
    }

    let target = DropTarget::Partition {
        key: key.clone(),
        index: args.index,
    };
    let (state, effect) = state.handle(GestureEvent::Drop(target), &issues, ctx.board());

    match effect {
        GestureEffect::Commit(plan) => {
            ctx.apply(&plan);
            ctx.save().await?;
            tracing::info!("Moved {} with {} pending steps", plan.issue_id, plan.steps.len());
            output::output_success(&plan);
        }
        GestureEffect::Restore => {
            output::output_failure(
                FailureKind::Validation,
                format!("Status {} is not on board {}", key.status, ctx.board().id),
            );
        }
        GestureEffect::None | GestureEffect::Preview(_) => {
            let plan = match state {
                GestureState::Dropped(plan) => plan,
                _ => ReorderPlan::noop(issue.id),
            };
            output::output_success(&plan);
        }
    }
    Ok(())
}

pub async fn handle_backlog(ctx: &mut CliContext, args: BacklogArgs) -> anyhow::Result<()> {
    if ctx.cache().issue(&args.issue).is_none() {
        output::output_failure(FailureKind::NotFound, format!("Issue not found: {}", args.issue));
    }

    let edge = if args.top {
        BacklogEdge::Top
    } else {
        BacklogEdge::Bottom
    };
    let plan = plan_backlog_edge(ctx.issues(), &args.issue, edge);
    if !plan.is_noop() {
        ctx.apply(&plan);
        ctx.save().await?;
    }
    output::output_success(&plan);
    Ok(())
}
