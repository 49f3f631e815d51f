use crate::cli::SyncArgs;
use crate::context::CliContext;
use crate::output::{self, FailureKind};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracker_client::{shared_cache, Dispatcher, FetchOutcome, HttpApi, RecordingNotifier};
use tracker_core::{AppConfig, TrackerResult};
use tracker_domain::ScopeKey;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScopeReport {
    scope: ScopeKey,
    count: u64,
    has_more: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncReport {
    project_id: String,
    scopes: Vec<ScopeReport>,
    issue_count: usize,
}

async fn fetch(dispatcher: &Dispatcher, project_id: &str, scope: &ScopeKey, more: bool) -> TrackerResult<FetchOutcome> {
    if !more {
        return dispatcher.refetch(project_id, scope).await;
    }
    match scope {
        ScopeKey::Sprint(sprint_id) => dispatcher.fetch_sprint_issues(project_id, sprint_id).await,
        ScopeKey::Backlog => dispatcher.fetch_backlog_issues(project_id).await,
        other => dispatcher.refetch(project_id, other).await,
    }
}

pub async fn handle(ctx: &mut CliContext, args: SyncArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(api_url) = args.api_url {
        config.api_base_url = api_url;
    }
    let project_id = args.project.unwrap_or_else(|| ctx.snapshot.project_id.clone());

    let scopes: Vec<ScopeKey> = match args.sprint {
        Some(sprint_id) => vec![ScopeKey::Sprint(sprint_id)],
        None => std::iter::once(ScopeKey::Backlog)
            .chain(ctx.board().sprints.iter().map(|s| ScopeKey::Sprint(s.id.clone())))
            .collect(),
    };

    let api = Arc::new(HttpApi::new(&config)?);
    tracing::debug!("Syncing {} scopes from {}", scopes.len(), api.base_url());
    let notifier = RecordingNotifier::new();
    let dispatcher = Dispatcher::new(
        api,
        shared_cache(ctx.cache().clone()),
        Arc::new(notifier.clone()),
        config,
    );

    let catalogs = dispatcher.fetch_catalogs().await;
    let results = join_all(
        scopes
            .iter()
            .map(|scope| fetch(&dispatcher, &project_id, scope, args.more)),
    )
    .await;

    // Whatever did arrive is kept even when another scope failed.
    let cache = dispatcher.snapshot();
    let scopes: Vec<ScopeReport> = scopes
        .into_iter()
        .map(|scope| {
            let metadata = cache.scope_metadata(&scope);
            ScopeReport {
                count: metadata.map(|m| m.count).unwrap_or(0),
                has_more: metadata.map(|m| m.pagination.has_cursor()).unwrap_or(false),
                scope,
            }
        })
        .collect();
    let issue_count = cache.issues().len();
    ctx.snapshot.project_id = project_id.clone();
    ctx.replace_cache(cache);
    ctx.save().await?;

    if catalogs.is_err() || results.iter().any(Result::is_err) {
        match notifier.take().first() {
            Some(notice) => output::output_notice(notice),
            None => output::output_failure(FailureKind::Server, "Sync failed"),
        }
    }

    output::output_success(SyncReport {
        project_id,
        scopes,
        issue_count,
    });
    Ok(())
}
