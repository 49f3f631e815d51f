use crate::EntityCache;

pub mod catalog_commands;
pub mod comment_commands;
pub mod issue_commands;
pub mod scope_commands;

pub use catalog_commands::*;
pub use comment_commands::*;
pub use issue_commands::*;
pub use scope_commands::*;

/// A cache mutation. Commands are plain data and cannot fail.
pub trait Command {
    fn execute(&self, cache: &mut EntityCache);

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Every mutation the entity cache accepts, grouped by the entity it touches.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheCommand {
    Issue(IssueCommand),
    Scope(ScopeCommand),
    Comment(CommentCommand),
    Catalog(CatalogCommand),
}

impl Command for CacheCommand {
    fn execute(&self, cache: &mut EntityCache) {
        match self {
            Self::Issue(command) => command.execute(cache),
            Self::Scope(command) => command.execute(cache),
            Self::Comment(command) => command.execute(cache),
            Self::Catalog(command) => command.execute(cache),
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Issue(command) => command.description(),
            Self::Scope(command) => command.description(),
            Self::Comment(command) => command.description(),
            Self::Catalog(command) => command.description(),
        }
    }
}

impl From<IssueCommand> for CacheCommand {
    fn from(command: IssueCommand) -> Self {
        Self::Issue(command)
    }
}

impl From<ScopeCommand> for CacheCommand {
    fn from(command: ScopeCommand) -> Self {
        Self::Scope(command)
    }
}

impl From<CommentCommand> for CacheCommand {
    fn from(command: CommentCommand) -> Self {
        Self::Comment(command)
    }
}

impl From<CatalogCommand> for CacheCommand {
    fn from(command: CatalogCommand) -> Self {
        Self::Catalog(command)
    }
}

/// Apply one command to the cache.
pub fn reduce(cache: &mut EntityCache, command: impl Into<CacheCommand>) {
    let command = command.into();
    tracing::debug!("Executing: {}", command.description());
    command.execute(cache);
}

/// Apply a batch of commands in order.
pub fn reduce_all<I>(cache: &mut EntityCache, commands: I)
where
    I: IntoIterator<Item = CacheCommand>,
{
    for command in commands {
        reduce(cache, command);
    }
}
