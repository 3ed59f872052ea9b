//! File-based session store.
//!
//! One YAML file per session, named after the session id.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::fs;

use crate::domain::foundation::SessionId;
use crate::domain::session::SessionRecord;
use crate::ports::{SessionStore, SessionStoreError};

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

fn io_error(e: std::io::Error) -> SessionStoreError {
    SessionStoreError::Io(e.to_string())
}

impl FileSessionStore {
    /// Store rooted at `dir`. The directory is created on first save.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{}.yaml", id))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError> {
        let path = self.session_path(id);
        let yaml = match fs::read_to_string(&path).await {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(e)),
        };

        let record: SessionRecord = serde_yaml::from_str(&yaml)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        if record.is_expired(Utc::now()) {
            tracing::debug!(session_id = %id, "Removing expired session file");
            self.destroy(id).await?;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn save(
        &self,
        id: &SessionId,
        record: &SessionRecord,
        _ttl: Duration,
    ) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.dir).await.map_err(io_error)?;

        let yaml = serde_yaml::to_string(record)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        // write-then-rename so a concurrent load never sees half a file
        let path = self.session_path(id);
        let tmp = path.with_extension("yaml.tmp");
        fs::write(&tmp, yaml).await.map_err(io_error)?;
        fs::rename(&tmp, &path).await.map_err(io_error)?;
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        match fs::remove_file(self.session_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(e)),
        }
    }
    /// Walks the directory and removes expired session files. Files that no
    /// longer parse are left alone for an operator to inspect.
    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(io_error(e)),
        };

        let now = Utc::now();
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("yaml") {
                continue;
            }
            let yaml = match fs::read_to_string(&path).await {
                Ok(yaml) => yaml,
                // raced with a destroy
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(e)),
            };
            let Ok(record) = serde_yaml::from_str::<SessionRecord>(&yaml) else {
                tracing::warn!(path = %path.display(), "Skipping unreadable session file");
                continue;
            };
            if record.is_expired(now) {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(io_error(e)),
                }
            }
        }
        Ok(removed)
    }
}
