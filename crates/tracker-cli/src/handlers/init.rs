use crate::cli::{BoardKind, InitArgs};
use crate::context::CliContext;
use crate::output;
use tracker_domain::{BoardColumn, BoardDefinition, BoardType, SprintSummary};

fn parse_column(spec: &str) -> Result<BoardColumn, String> {
    let invalid = || format!("Invalid column '{}'. Expected NAME=STATUS[,STATUS...]", spec);
    let (name, statuses) = spec.split_once('=').ok_or_else(invalid)?;
    let statuses: Vec<&str> = statuses
        .split(',')
        .map(str::trim)
        .filter(|status| !status.is_empty())
        .collect();
    if name.trim().is_empty() || statuses.is_empty() {
        return Err(invalid());
    }
    Ok(BoardColumn::new(name.trim(), statuses))
}

fn parse_sprint(spec: &str) -> Result<SprintSummary, String> {
    match spec.split_once('=') {
        Some((id, name)) if !id.trim().is_empty() => Ok(SprintSummary {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
        }),
        _ => Err(format!("Invalid sprint '{}'. Expected ID=NAME", spec)),
    }
}

pub async fn handle(file_path: &str, args: InitArgs) -> anyhow::Result<()> {
    if CliContext::exists(file_path) {
        output::output_error(&format!("{} already exists", file_path));
    }

    let columns = match args.columns.iter().map(|c| parse_column(c)).collect::<Result<Vec<_>, _>>() {
        Ok(columns) => columns,
        Err(e) => output::output_error(&e),
    };
    let sprints = match args.sprints.iter().map(|s| parse_sprint(s)).collect::<Result<Vec<_>, _>>() {
        Ok(sprints) => sprints,
        Err(e) => output::output_error(&e),
    };
    let board_type = match args.board_type {
        BoardKind::Kanban => BoardType::Kanban,
        BoardKind::Scrum => BoardType::Scrum,
    };

    let board = BoardDefinition::new(args.board_id, args.name, board_type, columns).with_sprints(sprints);
    let ctx = match CliContext::create(file_path, &args.project, board) {
        Ok(ctx) => ctx,
        Err(e) => output::output_tracker_error(&e),
    };
    ctx.save().await?;
    tracing::info!("Created board snapshot {}", file_path);
    output::output_success(ctx.board());
    Ok(())
}
