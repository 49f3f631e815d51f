use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracker_core::{TrackerError, TrackerResult};
use tracker_domain::{BoardDefinition, EntityCache, ProjectId};

use super::atomic_writer::AtomicWriter;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to rebuild a board offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub project_id: ProjectId,
    pub board: BoardDefinition,
    #[serde(default)]
    pub cache: EntityCache,
}

impl Snapshot {
    pub fn new(project_id: impl Into<ProjectId>, board: BoardDefinition) -> Self {
        Self {
            project_id: project_id.into(),
            board,
            cache: EntityCache::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotEnvelope {
    version: u32,
    saved_at: DateTime<Utc>,
    data: Snapshot,
}

/// JSON file holding one [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> TrackerResult<Snapshot> {
        let bytes = AtomicWriter::read_all(&self.path).await?;
        let envelope: SnapshotEnvelope = serde_json::from_slice(&bytes).map_err(|e| {
            TrackerError::Serialization(format!("{}: {}", self.path.display(), e))
        })?;

        if envelope.version != SNAPSHOT_VERSION {
            return Err(TrackerError::Serialization(format!(
                "Unsupported snapshot version: {}",
                envelope.version
            )));
        }
        envelope.data.board.validate()?;

        tracing::info!(
            "Loaded snapshot saved at {} from {}",
            envelope.saved_at,
            self.path.display()
        );
        Ok(envelope.data)
    }

    pub async fn save(&self, snapshot: &Snapshot) -> TrackerResult<()> {
        let envelope = SnapshotEnvelope {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            data: snapshot.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;

        AtomicWriter::write_atomic(&self.path, &bytes).await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracker_domain::{BoardColumn, BoardType, Issue, ScopeKey, ScopeMetadata};

    fn snapshot() -> Snapshot {
        let board = BoardDefinition::new(
            "b1",
            "Team board",
            BoardType::Kanban,
            vec![
                BoardColumn::new("To do", ["TODO"]),
                BoardColumn::new("Done", ["DONE"]),
            ],
        );
        let mut snapshot = Snapshot::new("p1", board);
        snapshot.cache = EntityCache::with_issues(vec![Issue::new("i1", "p1", "First", "TODO", 0)]);
        snapshot
            .cache
            .set_scope_metadata(ScopeKey::Backlog, ScopeMetadata::with_count(1));
        snapshot
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().join("board.json"));
        assert!(!store.exists());

        let original = snapshot();
        store.save(&original).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_unsupported_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        let mut value = serde_json::json!({
            "version": 1,
            "savedAt": "2024-01-01T00:00:00Z",
            "data": snapshot()
        });
        value["version"] = serde_json::json!(99);
        std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

        let err = SnapshotStore::new(&path).load().await.unwrap_err();
        assert!(err.to_string().contains("Unsupported snapshot version"));
    }

    #[tokio::test]
    async fn test_garbage_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = SnapshotStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, TrackerError::Serialization(_)));
    }
}
