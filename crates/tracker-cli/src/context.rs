use tracker_client::{Snapshot, SnapshotStore};
use tracker_core::{TrackerError, TrackerResult};
use tracker_domain::{BoardDefinition, EntityCache, Issue, ReorderPlan};

pub struct CliContext {
    pub snapshot: Snapshot,
    store: SnapshotStore,
}

impl CliContext {
    pub async fn load(file_path: &str) -> TrackerResult<Self> {
        let store = SnapshotStore::new(file_path);
        if !store.exists() {
            return Err(TrackerError::Config(format!(
                "{} does not exist, run `tracker init` first",
                file_path
            )));
        }
        let snapshot = store.load().await?;
        Ok(Self { snapshot, store })
    }

    /// Start a new snapshot; nothing is written until `save`.
    pub fn create(file_path: &str, project_id: &str, board: BoardDefinition) -> TrackerResult<Self> {
        board.validate()?;
        Ok(Self {
            snapshot: Snapshot::new(project_id, board),
            store: SnapshotStore::new(file_path),
        })
    }

    pub fn exists(file_path: &str) -> bool {
        SnapshotStore::new(file_path).exists()
    }

    pub fn board(&self) -> &BoardDefinition {
        &self.snapshot.board
    }

    pub fn cache(&self) -> &EntityCache {
        &self.snapshot.cache
    }

    pub fn issues(&self) -> &[Issue] {
        self.snapshot.cache.issues()
    }

    /// Write a plan's new placements into the local cache.
    pub fn apply(&mut self, plan: &ReorderPlan) {
        plan.apply_to(&mut self.snapshot.cache);
    }

    pub fn replace_cache(&mut self, cache: EntityCache) {
        self.snapshot.cache = cache;
    }

    pub async fn save(&self) -> TrackerResult<()> {
        self.store.save(&self.snapshot).await
    }
}
