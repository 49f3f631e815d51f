//! Request lifecycle: loading flag, remote call, then exactly one of cache
//! update or error notice, then the flag is cleared and the optional
//! success callback runs.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::Instrument;
use tracker_core::{AppConfig, Pagination, TrackerError, TrackerResult};
use tracker_domain::{
    reduce, BacklogEdge, CatalogCommand, Comment, CommentCommand, EntityCache, Issue,
    IssueCommand, IssueSelector, IssueStatus, IssueTypeEntry, NewIssue, OrdinalPatch,
    PriorityType, ScopeCommand, ScopeKey, ScopeMetadata,
};
use uuid::Uuid;

use crate::api::{ApiRequest, RemoteApi};
use crate::loading::LoadingTracker;
use crate::notify::{
    Notice, Notifier, DELETE_COMMENT_ERROR_MESSAGE, MOVE_ISSUE_ERROR_MESSAGE,
    MUTATION_ERROR_MESSAGE, SAVE_COMMENT_ERROR_MESSAGE, SAVE_ISSUE_ERROR_MESSAGE,
    UPDATE_COMMENT_ERROR_MESSAGE, UPDATE_ISSUE_ERROR_MESSAGE,
};
use crate::sequencer::ScopeSequencer;

/// The entity cache shared between the dispatcher and its readers.
pub type SharedCache = Arc<Mutex<EntityCache>>;

/// Runs after a successful call, once the cache has been updated.
pub type SuccessCallback = Box<dyn FnOnce() + Send>;

pub fn shared_cache(cache: EntityCache) -> SharedCache {
    Arc::new(Mutex::new(cache))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer response for the same scope was already applied.
    Stale,
    /// The catalog was already cached; no request was made.
    Skipped,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
struct IssuesPage {
    #[serde(default, deserialize_with = "null_as_default")]
    issues: Vec<Issue>,
    #[serde(default, deserialize_with = "null_as_default")]
    metadata: ScopeMetadata,
}

#[derive(Debug, Deserialize)]
struct IssueResult {
    issue: Issue,
}

#[derive(Debug, Default, Deserialize)]
struct CreatedIssue {
    #[serde(default)]
    issue: Option<Issue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsPage {
    #[serde(default, deserialize_with = "null_as_default")]
    issue_comments: Vec<Comment>,
    #[serde(default, deserialize_with = "null_as_default")]
    metadata: ScopeMetadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueStatusesResult {
    #[serde(default, deserialize_with = "null_as_default")]
    issue_statuses: Vec<IssueStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueTypesResult {
    #[serde(default, deserialize_with = "null_as_default")]
    issue_types: Vec<IssueTypeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriorityTypesResult {
    #[serde(default, deserialize_with = "null_as_default")]
    priority_types: Vec<PriorityType>,
}

fn parse<T: DeserializeOwned>(value: serde_json::Value) -> TrackerResult<T> {
    serde_json::from_value(value)
        .map_err(|e| TrackerError::Serialization(format!("Unexpected response shape: {}", e)))
}

fn to_body<T: serde::Serialize>(value: &T) -> TrackerResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| TrackerError::Serialization(e.to_string()))
}

/// Everything the lifecycle needs besides the response handling.
struct Call {
    /// Scope whose loading flag is raised.
    scope: ScopeKey,
    request: ApiRequest,
    /// Only fetches of a paginated scope are sequenced.
    sequenced: bool,
    failure: Notice,
    callback: Option<SuccessCallback>,
}

impl Call {
    fn query(scope: ScopeKey, request: ApiRequest) -> Self {
        Self {
            scope,
            request,
            sequenced: true,
            failure: Notice::query_error(),
            callback: None,
        }
    }

    fn mutation(scope: ScopeKey, request: ApiRequest, message: &str) -> Self {
        Self {
            scope,
            request,
            sequenced: false,
            failure: Notice::mutation_error(message),
            callback: None,
        }
    }

    fn unsequenced(mut self) -> Self {
        self.sequenced = false;
        self
    }

    fn then(mut self, callback: Option<SuccessCallback>) -> Self {
        self.callback = callback;
        self
    }
}

pub struct Dispatcher {
    api: Arc<dyn RemoteApi>,
    store: SharedCache,
    notifier: Arc<dyn Notifier>,
    loading: LoadingTracker,
    sequencer: ScopeSequencer,
    config: AppConfig,
}

impl Dispatcher {
    pub fn new(
        api: Arc<dyn RemoteApi>,
        store: SharedCache,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            api,
            store,
            notifier,
            loading: LoadingTracker::new(),
            sequencer: ScopeSequencer::new(),
            config,
        }
    }

    pub fn store(&self) -> &SharedCache {
        &self.store
    }

    pub fn loading(&self) -> &LoadingTracker {
        &self.loading
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Copy of the current cache state.
    pub fn snapshot(&self) -> EntityCache {
        self.store.lock().clone()
    }

    fn pagination(&self, scope: &ScopeKey) -> Pagination {
        self.store.lock().pagination_for(scope, self.config.page_size)
    }

    fn first_page(&self) -> Pagination {
        Pagination::new(self.config.page_size)
    }

    fn apply_response<T, A>(&self, scope: &ScopeKey, seq: Option<u64>, parsed: T, apply: A) -> FetchOutcome
    where
        A: FnOnce(&mut EntityCache, T),
    {
        let mut cache = self.store.lock();
        if let Some(seq) = seq {
            if !self.sequencer.try_apply(scope, seq) {
                tracing::debug!("Discarding stale response #{} for {}", seq, scope);
                return FetchOutcome::Stale;
            }
        }
        apply(&mut cache, parsed);
        FetchOutcome::Applied
    }

    async fn execute<T, P, A>(&self, call: Call, parse_result: P, apply: A) -> TrackerResult<FetchOutcome>
    where
        T: Send,
        P: FnOnce(serde_json::Value) -> TrackerResult<T> + Send,
        A: FnOnce(&mut EntityCache, T) + Send,
    {
        let Call {
            scope,
            request,
            sequenced,
            failure,
            callback,
        } = call;

        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!(
            "request",
            %request_id,
            method = %request.method,
            target = %request.target()
        );

        async move {
            let guard = self.loading.begin(scope.clone());
            let seq = sequenced.then(|| self.sequencer.next(&scope));
            let is_query = request.method.is_query();
            tracing::debug!("Request started");

            let outcome = match self.api.send(request).await.and_then(parse_result) {
                Ok(parsed) => Ok(self.apply_response(&scope, seq, parsed, apply)),
                Err(e) => Err(e),
            };

            match &outcome {
                Ok(result) if is_query => tracing::debug!(?result, "Request succeeded"),
                Ok(_) => tracing::info!("Request succeeded"),
                Err(e) => {
                    tracing::warn!(kind = ?e.kind(), "Request failed: {}", e);
                    self.notifier.notify(failure);
                }
            }

            guard.finish();

            if outcome.is_ok() {
                if let Some(callback) = callback {
                    callback();
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    async fn fetch_issues_page(
        &self,
        scope: ScopeKey,
        path: String,
        pagination: Pagination,
    ) -> TrackerResult<FetchOutcome> {
        let request = ApiRequest::get(path).with_pagination(&pagination);
        let metadata_scope = scope.clone();
        self.execute(Call::query(scope, request), parse::<IssuesPage>, move |cache, page| {
            reduce(cache, IssueCommand::Upsert(page.issues));
            reduce(cache, ScopeCommand::Set(metadata_scope, page.metadata));
        })
        .await
    }

    pub async fn fetch_project_issues(&self, project_id: &str) -> TrackerResult<FetchOutcome> {
        let scope = ScopeKey::ProjectIssues;
        let pagination = self.pagination(&scope);
        self.fetch_issues_page(scope, format!("/projects/{}/issues", project_id), pagination)
            .await
    }

    pub async fn fetch_backlog_issues(&self, project_id: &str) -> TrackerResult<FetchOutcome> {
        let scope = ScopeKey::Backlog;
        let pagination = self.pagination(&scope);
        self.fetch_issues_page(scope, format!("/projects/{}/backlog/issues", project_id), pagination)
            .await
    }

    pub async fn fetch_sprint_issues(
        &self,
        project_id: &str,
        sprint_id: &str,
    ) -> TrackerResult<FetchOutcome> {
        let scope = ScopeKey::Sprint(sprint_id.to_string());
        let pagination = self.pagination(&scope);
        self.fetch_issues_page(
            scope,
            format!("/projects/{}/sprints/{}/issues", project_id, sprint_id),
            pagination,
        )
        .await
    }

    /// Fetch the first page of a scope again, leaving its metadata untouched
    /// until the response arrives.
    pub async fn refetch(&self, project_id: &str, scope: &ScopeKey) -> TrackerResult<FetchOutcome> {
        let first_page = self.first_page();
        match scope {
            ScopeKey::ProjectIssues => {
                self.fetch_issues_page(scope.clone(), format!("/projects/{}/issues", project_id), first_page)
                    .await
            }
            ScopeKey::Backlog => {
                self.fetch_issues_page(
                    scope.clone(),
                    format!("/projects/{}/backlog/issues", project_id),
                    first_page,
                )
                .await
            }
            ScopeKey::Sprint(sprint_id) => {
                self.fetch_issues_page(
                    scope.clone(),
                    format!("/projects/{}/sprints/{}/issues", project_id, sprint_id),
                    first_page,
                )
                .await
            }
            ScopeKey::IssueComments(issue_id) => self.fetch_comments_page(issue_id, first_page).await,
        }
    }

    pub async fn fetch_issue(&self, issue_id: &str) -> TrackerResult<FetchOutcome> {
        let request = ApiRequest::get(format!("/issues/{}", issue_id));
        let call = Call::query(ScopeKey::ProjectIssues, request).unsequenced();
        self.execute(call, parse::<IssueResult>, |cache, result| {
            reduce(cache, IssueCommand::Upsert(vec![result.issue]));
        })
        .await
    }

    async fn fetch_comments_page(&self, issue_id: &str, pagination: Pagination) -> TrackerResult<FetchOutcome> {
        let scope = ScopeKey::IssueComments(issue_id.to_string());
        let request = ApiRequest::get(format!("/issues/{}/comments", issue_id)).with_pagination(&pagination);
        let metadata_scope = scope.clone();
        let issue_id = issue_id.to_string();
        self.execute(Call::query(scope, request), parse::<CommentsPage>, move |cache, page| {
            let comments = page
                .issue_comments
                .into_iter()
                .map(|mut comment| {
                    comment.issue_id = issue_id.clone();
                    comment
                })
                .collect();
            reduce(cache, CommentCommand::Upsert(comments));
            reduce(cache, ScopeCommand::Set(metadata_scope, page.metadata));
        })
        .await
    }

    pub async fn fetch_comments(&self, issue_id: &str) -> TrackerResult<FetchOutcome> {
        let pagination = self.pagination(&ScopeKey::IssueComments(issue_id.to_string()));
        self.fetch_comments_page(issue_id, pagination).await
    }

    pub async fn fetch_issue_statuses(&self) -> TrackerResult<FetchOutcome> {
        if !self.store.lock().catalogs().issue_statuses.is_empty() {
            return Ok(FetchOutcome::Skipped);
        }
        let call = Call::query(ScopeKey::ProjectIssues, ApiRequest::get("/issueStatuses")).unsequenced();
        self.execute(call, parse::<IssueStatusesResult>, |cache, result| {
            reduce(cache, CatalogCommand::SetIssueStatuses(result.issue_statuses));
        })
        .await
    }

    pub async fn fetch_issue_types(&self) -> TrackerResult<FetchOutcome> {
        if !self.store.lock().catalogs().issue_types.is_empty() {
            return Ok(FetchOutcome::Skipped);
        }
        let call = Call::query(ScopeKey::ProjectIssues, ApiRequest::get("/issueTypes")).unsequenced();
        self.execute(call, parse::<IssueTypesResult>, |cache, result| {
            reduce(cache, CatalogCommand::SetIssueTypes(result.issue_types));
        })
        .await
    }

    pub async fn fetch_priority_types(&self) -> TrackerResult<FetchOutcome> {
        if !self.store.lock().catalogs().priority_types.is_empty() {
            return Ok(FetchOutcome::Skipped);
        }
        let call = Call::query(ScopeKey::ProjectIssues, ApiRequest::get("/priorityTypes")).unsequenced();
        self.execute(call, parse::<PriorityTypesResult>, |cache, result| {
            reduce(cache, CatalogCommand::SetPriorityTypes(result.priority_types));
        })
        .await
    }

    /// Statuses, issue types and priorities, concurrently.
    pub async fn fetch_catalogs(&self) -> TrackerResult<()> {
        let (statuses, types, priorities) = futures::join!(
            self.fetch_issue_statuses(),
            self.fetch_issue_types(),
            self.fetch_priority_types()
        );
        statuses?;
        types?;
        priorities?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    async fn mutate<A>(&self, call: Call, apply: A) -> TrackerResult<()>
    where
        A: FnOnce(&mut EntityCache, serde_json::Value) + Send,
    {
        self.execute(call, Ok, apply).await.map(|_| ())
    }

    pub async fn create_issue(
        &self,
        issue: &NewIssue,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        if let Err(e) = issue.validate() {
            tracing::warn!("Rejected new issue: {}", e);
            self.notifier.notify(Notice::mutation_error(SAVE_ISSUE_ERROR_MESSAGE));
            return Err(e);
        }

        let request = ApiRequest::post("/issues").with_body(to_body(issue)?);
        let call = Call::mutation(ScopeKey::Backlog, request, SAVE_ISSUE_ERROR_MESSAGE).then(callback);
        self.mutate(call, |cache, result| {
            match serde_json::from_value::<CreatedIssue>(result) {
                Ok(CreatedIssue { issue: Some(issue) }) => reduce(cache, IssueCommand::Upsert(vec![issue])),
                _ => tracing::debug!("Create response carried no issue"),
            }
            reduce(cache, ScopeCommand::Clear(ScopeKey::Backlog));
        })
        .await
    }

    pub async fn update_issue(
        &self,
        project_id: &str,
        issue: &Issue,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let request = ApiRequest::put(format!("/projects/{}/issues/{}", project_id, issue.id))
            .with_body(to_body(issue)?);
        let scope = ScopeKey::for_placement(issue.sprint_id.as_ref());
        let call = Call::mutation(scope, request, UPDATE_ISSUE_ERROR_MESSAGE).then(callback);
        let saved = issue.clone();
        self.mutate(call, move |cache, _| {
            reduce(cache, IssueCommand::ReplaceExisting(vec![saved]));
        })
        .await
    }

    /// Persist an ordinal patch list. `sprint_id` is the board the drop
    /// happened on; `None` means the backlog board.
    pub async fn update_ordinals(
        &self,
        project_id: &str,
        patches: &[OrdinalPatch],
        sprint_id: Option<&str>,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let request = ApiRequest::put(format!("/projects/{}/issue/ordinals", project_id))
            .with_body(serde_json::json!({ "issueOrdinals": patches }));
        let scope = ScopeKey::for_placement(sprint_id.map(str::to_string).as_ref());
        let call = Call::mutation(scope, request, MUTATION_ERROR_MESSAGE).then(callback);
        let on_sprint_board = sprint_id.is_some();
        self.mutate(call, move |cache, _| {
            if on_sprint_board {
                reduce(cache, ScopeCommand::RemoveAllSprints);
            } else {
                reduce(cache, IssueCommand::Remove(IssueSelector::Backlog));
            }
        })
        .await
    }

    pub async fn send_to_backlog(
        &self,
        project_id: &str,
        issue_id: &str,
        from_sprint_id: Option<&str>,
        edge: BacklogEdge,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let request = ApiRequest::put(format!(
            "/projects/{}/backlog/issues/{}/{}",
            project_id,
            issue_id,
            edge.as_str()
        ));
        let call = Call::mutation(ScopeKey::Backlog, request, MOVE_ISSUE_ERROR_MESSAGE).then(callback);
        let from_sprint = from_sprint_id.map(str::to_string);
        self.mutate(call, move |cache, _| {
            reduce(cache, ScopeCommand::Clear(ScopeKey::Backlog));
            if let Some(sprint_id) = from_sprint {
                reduce(cache, ScopeCommand::Remove(ScopeKey::Sprint(sprint_id)));
            }
        })
        .await
    }

    pub async fn send_to_sprint(
        &self,
        project_id: &str,
        sprint_id: &str,
        issue_id: &str,
        from_sprint_id: Option<&str>,
        status: &str,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let request = ApiRequest::put(format!(
            "/projects/{}/sprints/{}/issues/{}",
            project_id, sprint_id, issue_id
        ))
        .with_body(serde_json::json!({ "status": status }));
        let scope = ScopeKey::Sprint(sprint_id.to_string());
        let call = Call::mutation(scope, request, MOVE_ISSUE_ERROR_MESSAGE).then(callback);
        let to_sprint = sprint_id.to_string();
        let from_sprint = from_sprint_id.map(str::to_string);
        self.mutate(call, move |cache, _| {
            reduce(cache, ScopeCommand::Clear(ScopeKey::Backlog));
            reduce(cache, ScopeCommand::Remove(ScopeKey::Sprint(to_sprint)));
            if let Some(sprint_id) = from_sprint {
                reduce(cache, ScopeCommand::Remove(ScopeKey::Sprint(sprint_id)));
            }
        })
        .await
    }

    pub async fn create_comment(
        &self,
        issue_id: &str,
        text: &str,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let scope = ScopeKey::IssueComments(issue_id.to_string());
        let request = ApiRequest::post(format!("/issues/{}/comments", issue_id))
            .with_body(serde_json::json!({ "text": text }));
        let call = Call::mutation(scope.clone(), request, SAVE_COMMENT_ERROR_MESSAGE).then(callback);
        self.mutate(call, move |cache, _| {
            reduce(cache, CommentCommand::Clear);
            reduce(cache, ScopeCommand::Clear(scope));
        })
        .await
    }

    pub async fn update_comment(
        &self,
        issue_id: &str,
        comment: &Comment,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let scope = ScopeKey::IssueComments(issue_id.to_string());
        let request = ApiRequest::put(format!("/issues/{}/comments/{}", issue_id, comment.id))
            .with_body(to_body(comment)?);
        let call = Call::mutation(scope.clone(), request, UPDATE_COMMENT_ERROR_MESSAGE).then(callback);
        self.mutate(call, move |cache, _| {
            reduce(cache, CommentCommand::Clear);
            reduce(cache, ScopeCommand::Clear(scope));
        })
        .await
    }

    pub async fn delete_comment(
        &self,
        issue_id: &str,
        comment_id: &str,
        callback: Option<SuccessCallback>,
    ) -> TrackerResult<()> {
        let scope = ScopeKey::IssueComments(issue_id.to_string());
        let request = ApiRequest::delete(format!("/issues/{}/comments/{}", issue_id, comment_id));
        let call = Call::mutation(scope, request, DELETE_COMMENT_ERROR_MESSAGE).then(callback);
        let comment_id = comment_id.to_string();
        self.mutate(call, move |cache, _| {
            reduce(cache, CommentCommand::Remove(comment_id));
        })
        .await
    }
}
