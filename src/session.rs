use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::RwLock;

use crate::{error::SessionError, models::SessionRecord};

/// Storage key the dashboard has always used for the identity snapshot.
pub const SESSION_KEY: &str = "usuario";

/// SessionStore
///
/// Contract for the process-wide holder of the last written session record. The login flow
/// is the single writer; every guarded navigation reads. Last write wins.
///
/// Swapping `FileSessionStore` for `InMemorySessionStore` keeps tests away from the disk.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the record, replacing any previous one. No merging.
    async fn write(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// The stored record, or `None` if nothing was written or it was cleared.
    async fn read(&self) -> Result<Option<SessionRecord>, SessionError>;

    /// Removes the record (logout).
    async fn clear(&self) -> Result<(), SessionError>;
}

/// SessionState
///
/// Shared handle to the session store inside the application state.
pub type SessionState = Arc<dyn SessionStore>;

// --- Durable implementation ---

/// FileSessionStore
///
/// Durable store backed by a small JSON document that maps storage keys to serialized
/// values, the same shape browser local storage has. Survives process restarts.
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes read-modify-write cycles on the document.
    lock: RwLock<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_document(&self) -> Result<BTreeMap<String, String>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(document) => Ok(document),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), "session document unreadable, treating as empty: {}", e);
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn store_document(&self, document: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-then-rename so a crash never leaves a half-written document behind.
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(document)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn write(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let _guard = self.lock.write().await;
        let mut document = self.load_document().await?;
        document.insert(SESSION_KEY.to_string(), record.raw.clone());
        self.store_document(&document).await?;
        tracing::debug!(path = %self.path.display(), "session record written");
        Ok(())
    }

    async fn read(&self) -> Result<Option<SessionRecord>, SessionError> {
        let _guard = self.lock.read().await;
        let document = self.load_document().await?;
        let Some(raw) = document.get(SESSION_KEY) else {
            return Ok(None);
        };

        match SessionRecord::from_raw(raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!("stored session record is not valid JSON claims, ignoring it: {}", e);
                Ok(None)
            }
        }
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.lock.write().await;
        let mut document = self.load_document().await?;
        if document.remove(SESSION_KEY).is_some() {
            self.store_document(&document).await?;
            tracing::debug!(path = %self.path.display(), "session record cleared");
        }
        Ok(())
    }
}

// --- In-memory implementation (tests, throwaway local runs) ---

/// InMemorySessionStore
///
/// Non-durable store. Keeps the record as-is so tests can seed exact claims.
#[derive(Default)]
pub struct InMemorySessionStore {
    record: RwLock<Option<SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: SessionRecord) -> Self {
        Self {
            record: RwLock::new(Some(record)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn write(&self, record: &SessionRecord) -> Result<(), SessionError> {
        *self.record.write().await = Some(record.clone());
        Ok(())
    }

    async fn read(&self) -> Result<Option<SessionRecord>, SessionError> {
        Ok(self.record.read().await.clone())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.record.write().await = None;
        Ok(())
    }
}
