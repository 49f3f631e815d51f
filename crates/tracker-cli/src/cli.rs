use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Issue board state engine: cached boards, drag and drop, remote sync", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the board snapshot file (or set TRACKER_FILE env var)
    #[arg(short, long, value_name = "FILE", env = "TRACKER_FILE")]
    pub file: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a snapshot file with a board layout
    Init(InitArgs),
    /// Show the board, one column per status group
    Board(BoardArgs),
    /// Drag an issue to a position in a column
    Move(MoveArgs),
    /// Send an issue to the top or bottom of the backlog
    Backlog(BacklogArgs),
    /// Fetch catalogs and issues from the remote API into the snapshot
    Sync(SyncArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BoardKind {
    Kanban,
    Scrum,
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long, default_value = "board")]
    pub board_id: String,
    #[arg(long)]
    pub name: String,
    #[arg(long = "type", value_enum, default_value = "kanban")]
    pub board_type: BoardKind,
    /// Column as NAME=STATUS[,STATUS...]; repeat in display order
    #[arg(long = "column", required = true)]
    pub columns: Vec<String>,
    /// Sprint swimlane as ID=NAME; repeat in display order
    #[arg(long = "sprint")]
    pub sprints: Vec<String>,
}

#[derive(Args)]
pub struct BoardArgs {
    /// Show this sprint instead of the backlog
    #[arg(long)]
    pub sprint: Option<String>,
    /// Show every swimlane of the board
    #[arg(long, conflicts_with = "sprint")]
    pub all: bool,
}

#[derive(Args)]
pub struct MoveArgs {
    #[arg(long)]
    pub issue: String,
    /// Destination status (defaults to the current one)
    #[arg(long)]
    pub status: Option<String>,
    /// Destination sprint
    #[arg(long, conflicts_with = "backlog")]
    pub sprint: Option<String>,
    /// Move into the backlog
    #[arg(long)]
    pub backlog: bool,
    /// Position in the destination column (defaults to the end)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct BacklogArgs {
    #[arg(long)]
    pub issue: String,
    #[arg(long, conflicts_with = "bottom", required_unless_present = "bottom")]
    pub top: bool,
    #[arg(long)]
    pub bottom: bool,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Project to fetch (defaults to the snapshot's project)
    #[arg(long)]
    pub project: Option<String>,
    /// Fetch only this sprint
    #[arg(long)]
    pub sprint: Option<String>,
    /// Fetch the next page from the stored cursor instead of the first page
    #[arg(long)]
    pub more: bool,
    /// Overrides api_base_url from the config file
    #[arg(long, env = "TRACKER_API_URL")]
    pub api_url: Option<String>,
}
