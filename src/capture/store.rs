//! Durable storage for raw captured HTML.
//!
//! The store is an independent failure domain: a failed persist is logged
//! and swallowed by the capturer, and the snapshot stays usable in memory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Storage backend for raw page bytes, keyed by owner/subject/timestamp
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist raw HTML and return the storage pointer
    async fn store(
        &self,
        owner_id: Uuid,
        subject_id: Uuid,
        captured_at: DateTime<Utc>,
        raw_html: &[u8],
    ) -> Result<String>;

    /// Load previously stored raw HTML by its storage pointer
    async fn load(&self, storage_path: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed snapshot store
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, owner_id: Uuid, subject_id: Uuid, captured_at: DateTime<Utc>) -> PathBuf {
        self.root
            .join(owner_id.to_string())
            .join(subject_id.to_string())
            .join(format!("page-{}.html", captured_at.timestamp_millis()))
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn store(
        &self,
        owner_id: Uuid,
        subject_id: Uuid,
        captured_at: DateTime<Utc>,
        raw_html: &[u8],
    ) -> Result<String> {
        let path = self.path_for(owner_id, subject_id, captured_at);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create store directory {}", parent.display()))?;
        }

        tokio::fs::write(&path, raw_html)
            .await
            .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;

        Ok(path.to_string_lossy().into_owned())
    }

    async fn load(&self, storage_path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(storage_path)
            .await
            .with_context(|| format!("Failed to read snapshot from {}", storage_path))
    }
}
