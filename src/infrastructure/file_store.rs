// File-backed persistence - One JSON file per key
use crate::application::persistence::Persistence;
use crate::error::StoreError;
use async_trait::async_trait;
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::Backend(format!("invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl Persistence for FileStore {
    /// Writes to a sibling temporary file and renames it into place, so a
    /// crash mid-write leaves the previous value intact.
    async fn save(&self, key: &str, blob: Bytes) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &blob)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(key, e))?;

        tracing::trace!("Saved {} bytes to {}", blob.len(), path.display());
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.load("WarningLogs").await.unwrap(), None);

        store
            .save("WarningLogs", Bytes::from_static(b"[1]"))
            .await
            .unwrap();
        store
            .save("WarningLogs", Bytes::from_static(b"[1,2]"))
            .await
            .unwrap();

        assert_eq!(
            store.load("WarningLogs").await.unwrap(),
            Some(Bytes::from_static(b"[1,2]"))
        );
        assert!(store.dir().join("WarningLogs.json").exists());
        assert!(!store.dir().join("WarningLogs.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let result = store.save("../escape", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert!(store.load("").await.is_err());
    }
}
