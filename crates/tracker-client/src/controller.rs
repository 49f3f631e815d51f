//! Drives one board: feeds gesture events to the reorder engine, applies the
//! resulting plan optimistically and persists it through the dispatcher.

use futures::future::join_all;
use std::sync::Arc;
use tracker_core::TrackerResult;
use tracker_domain::{
    plan_backlog_edge, project_board, BacklogEdge, BoardDefinition, BoardScope,
    BoardView, GestureEffect, GestureEvent, GestureState, Issue, PersistStep,
    ProjectId, ReorderPlan, ScopeKey,
};

use crate::dispatcher::Dispatcher;

pub struct BoardController {
    dispatcher: Arc<Dispatcher>,
    project_id: ProjectId,
    board: BoardDefinition,
    gesture: GestureState,
}

impl BoardController {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        project_id: impl Into<ProjectId>,
        board: BoardDefinition,
    ) -> TrackerResult<Self> {
        board.validate()?;
        Ok(Self {
            dispatcher,
            project_id: project_id.into(),
            board,
            gesture: GestureState::Idle,
        })
    }

    pub fn board(&self) -> &BoardDefinition {
        &self.board
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    /// Run `f` against the current projection, including any drag preview.
    pub fn with_view<R>(&self, scope: &BoardScope, f: impl FnOnce(&BoardView<'_>) -> R) -> R {
        let cache = self.dispatcher.store().lock();
        let view = project_board(&cache, &self.board, scope, self.gesture.preview());
        f(&view)
    }

    fn issues(&self) -> Vec<Issue> {
        self.dispatcher.store().lock().issues().to_vec()
    }

    /// Feed one gesture event. A drop that changes anything is committed
    /// before this returns.
    pub async fn handle(&mut self, event: GestureEvent) -> TrackerResult<GestureEffect> {
        let issues = self.issues();
        let state = std::mem::take(&mut self.gesture);
        let (next, effect) = state.handle(event, &issues, &self.board);
        self.gesture = next;

        if let GestureEffect::Commit(plan) = &effect {
            self.commit(plan).await?;
        }
        Ok(effect)
    }

    pub async fn send_to_backlog_edge(
        &mut self,
        issue_id: &str,
        edge: BacklogEdge,
    ) -> TrackerResult<ReorderPlan> {
        let plan = plan_backlog_edge(&self.issues(), issue_id, edge);
        self.commit(&plan).await?;
        Ok(plan)
    }

    /// Apply locally, then persist step by step. The optimistic state is not
    /// rolled back on failure; the invalidated scopes are refetched instead
    /// when `resync_on_failure` is set.
    pub async fn commit(&self, plan: &ReorderPlan) -> TrackerResult<()> {
        if plan.is_noop() {
            tracing::debug!("Nothing to persist for {}", plan.issue_id);
            return Ok(());
        }

        {
            let mut cache = self.dispatcher.store().lock();
            plan.apply_to(&mut cache);
        }

        match self.persist(plan).await {
            Ok(()) => {
                tracing::info!("Persisted move of {} ({} steps)", plan.issue_id, plan.steps.len());
                self.resync(&plan.invalidated).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to persist move of {}: {}", plan.issue_id, e);
                if self.dispatcher.config().resync_on_failure {
                    self.resync(&plan.invalidated).await;
                }
                Err(e)
            }
        }
    }

    async fn persist(&self, plan: &ReorderPlan) -> TrackerResult<()> {
        let project_id = self.project_id.as_str();
        for step in &plan.steps {
            match step {
                PersistStep::MoveToSprint {
                    issue_id,
                    sprint_id,
                    from_sprint_id,
                    status,
                } => {
                    self.dispatcher
                        .send_to_sprint(project_id, sprint_id, issue_id, from_sprint_id.as_deref(), status, None)
                        .await?
                }
                PersistStep::SendToBacklog {
                    issue_id,
                    from_sprint_id,
                    edge,
                } => {
                    self.dispatcher
                        .send_to_backlog(project_id, issue_id, from_sprint_id.as_deref(), *edge, None)
                        .await?
                }
                PersistStep::UpdateOrdinals { sprint_id, patches } => {
                    self.dispatcher
                        .update_ordinals(project_id, patches, sprint_id.as_deref(), None)
                        .await?
                }
            }
        }
        Ok(())
    }

    async fn resync(&self, scopes: &[ScopeKey]) {
        let results = join_all(
            scopes
                .iter()
                .map(|scope| self.dispatcher.refetch(&self.project_id, scope)),
        )
        .await;

        for (scope, result) in scopes.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!("Resync of {} failed: {}", scope, e);
            }
        }
    }
}
