use crate::cli::BoardArgs;
use crate::context::CliContext;
use crate::output;
use tracker_domain::{project_board, project_swimlanes, BoardScope};

pub async fn handle(ctx: &CliContext, args: BoardArgs) -> anyhow::Result<()> {
    if args.all {
        let views = project_swimlanes(ctx.cache(), ctx.board(), None);
        output::output_list(views);
        return Ok(());
    }

    let scope = match args.sprint {
        Some(sprint_id) => {
            if !ctx.board().sprints.iter().any(|sprint| sprint.id == sprint_id) {
                tracing::warn!("Sprint {} is not a swimlane of board {}", sprint_id, ctx.board().id);
            }
            BoardScope::Sprint(sprint_id)
        }
        None => BoardScope::Backlog,
    };

    let view = project_board(ctx.cache(), ctx.board(), &scope, None);
    output::output_success(&view);
    Ok(())
}
