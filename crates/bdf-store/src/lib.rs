//! Manually curated deal storage for BDF.
//!
//! A small JSON-file-backed record store with `list`/`append` semantics. The
//! aggregator treats it as one more source; admin curation appends records,
//! it never mutates aggregated output.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bdf_core::DealRecord;
use chrono::Utc;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub const CRATE_NAME: &str = "bdf-store";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("curated store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("curated store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Curated deal store: in-memory list mirrored to a JSON file.
///
/// Every `append` rewrites the file through a temp-file rename, so readers
/// never observe a partially written store.
#[derive(Debug)]
pub struct CuratedDealStore {
    path: PathBuf,
    records: Mutex<Vec<DealRecord>>,
}

impl CuratedDealStore {
    /// Open the store at `path`. A missing file is an empty store, not an
    /// error; a present-but-unparsable file is.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read_to_string(&path).await {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// An unbacked store for tests and ephemeral setups: starts from the
    /// given records and persists into `path` on the first append.
    pub fn in_memory(path: impl Into<PathBuf>, records: Vec<DealRecord>) -> Self {
        Self {
            path: path.into(),
            records: Mutex::new(records),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current curated records in insertion order.
    pub async fn list(&self) -> Vec<DealRecord> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Append one curated record and persist the full list atomically.
    ///
    /// The final id is minted here, under the store lock: concurrent appends
    /// each see a distinct index, so persisted ids never collide. The stored
    /// record is returned.
    pub async fn append(&self, mut record: DealRecord) -> Result<DealRecord, StoreError> {
        let mut records = self.records.lock().await;
        record.id = format!("curated-{}-{}", Utc::now().timestamp(), records.len());
        records.push(record.clone());
        self.persist(&records).await?;
        Ok(record)
    }

    async fn persist(&self, records: &[DealRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating store directory {}", parent.display()))?;
            }
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let temp_path = self.path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("creating temp store file {}", temp_path.display()))?;
        file.write_all(&bytes)
            .await
            .with_context(|| format!("writing temp store file {}", temp_path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("flushing temp store file {}", temp_path.display()))?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| {
                format!(
                    "renaming temp store {} -> {}",
                    temp_path.display(),
                    self.path.display()
                )
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdf_core::{normalize, RawDeal};
    use tempfile::tempdir;

    fn curated(title: &str) -> DealRecord {
        let raw = RawDeal {
            title: Some(title.to_string()),
            original_price: Some(100.0),
            discounted_price: Some(60.0),
            platform: Some("other".to_string()),
            ..RawDeal::default()
        };
        normalize(&raw, "curated", 1700000000, 0).unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_store() {
        let dir = tempdir().unwrap();
        let store = CuratedDealStore::load(dir.path().join("curated.json"))
            .await
            .unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn append_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curated.json");

        let store = CuratedDealStore::load(&path).await.unwrap();
        store.append(curated("Hand-picked Blender")).await.unwrap();
        store.append(curated("Hand-picked Kettle")).await.unwrap();

        let reloaded = CuratedDealStore::load(&path).await.unwrap();
        let records = reloaded.list().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Hand-picked Blender");
        assert_eq!(records[1].title, "Hand-picked Kettle");
    }

    #[tokio::test]
    async fn corrupt_file_is_reported_not_swallowed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curated.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let err = CuratedDealStore::load(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[tokio::test]
    async fn concurrent_appends_never_share_an_id() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(
            CuratedDealStore::load(dir.path().join("curated.json"))
                .await
                .unwrap(),
        );

        let mut tasks = Vec::new();
        for n in 0..4 {
            let store = std::sync::Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store
                    .append(curated(&format!("Pick {n}")))
                    .await
                    .unwrap()
                    .id
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for task in tasks {
            assert!(ids.insert(task.await.unwrap()));
        }
        assert_eq!(ids.len(), 4);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn no_temp_file_left_behind_after_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("curated.json");
        let store = CuratedDealStore::load(&path).await.unwrap();
        store.append(curated("Tidy Writer")).await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
