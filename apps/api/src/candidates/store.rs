//! Flat-file candidate store — list / create / update over a single JSON document.
//!
//! Reads go straight to disk so every call sees the latest file contents.
//! Writes are serialised through one async mutex and replace the file atomically
//! (temp file in the same directory, then rename).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::candidates::models::{CandidateFile, CandidateRecord, StoredCandidate};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("candidate {0} already exists")]
    Conflict(i64),

    #[error("candidate {0} not found")]
    NotFound(i64),

    #[error("invalid candidate: {0}")]
    Invalid(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct CandidateStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CandidateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole store. A missing file is an empty store.
    pub async fn load(&self) -> Result<CandidateFile, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CandidateFile::default()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// All well-formed records in stored order. Malformed entries stay on disk
    /// and are skipped here.
    pub async fn list(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let employees = self.load().await?.employees;
        let total = employees.len();
        let records: Vec<CandidateRecord> = employees
            .into_iter()
            .filter_map(StoredCandidate::into_record)
            .collect();
        if records.len() < total {
            warn!(
                "Skipped {} malformed candidate entries in {}",
                total - records.len(),
                self.path.display()
            );
        }
        Ok(records)
    }

    /// Appends a record. Rejects ids that already exist; the file is left untouched.
    pub async fn create(&self, record: CandidateRecord) -> Result<CandidateRecord, StoreError> {
        record.validate_for_write().map_err(StoreError::Invalid)?;

        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;
        if data.employees.iter().any(|e| e.id() == Some(record.id)) {
            return Err(StoreError::Conflict(record.id));
        }
        data.employees.push(StoredCandidate::Record(record.clone()));
        self.save(&data).await?;

        info!("Created candidate {}", record.id);
        Ok(record)
    }

    /// Replaces the entry with `id` in place, keeping its position. A malformed
    /// entry with that id is repaired by the new record.
    pub async fn update(
        &self,
        id: i64,
        record: CandidateRecord,
    ) -> Result<CandidateRecord, StoreError> {
        record.validate_for_write().map_err(StoreError::Invalid)?;
        if record.id != id {
            return Err(StoreError::Invalid(format!(
                "body id {} does not match path id {id}",
                record.id
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut data = self.load().await?;
        let slot = data
            .employees
            .iter_mut()
            .find(|e| e.id() == Some(id))
            .ok_or(StoreError::NotFound(id))?;
        *slot = StoredCandidate::Record(record.clone());
        self.save(&data).await?;

        info!("Updated candidate {id}");
        Ok(record)
    }

    async fn save(&self, data: &CandidateFile) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(data)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &json))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))??;
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
