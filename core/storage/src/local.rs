//! Local filesystem storage client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use cirrus_common::{Error, ObjectKey, Result};

use crate::client::{ObjectInfo, StorageClient};

/// Environment variable naming the root directory for [`LocalClient::from_env`].
pub const LOCAL_ROOT_ENV: &str = "CIRRUS_LOCAL_ROOT";

/// Local filesystem storage client.
///
/// Maps object keys to paths under a root directory, treating `/` in keys
/// as directory separators. Intended for local development and integration
/// tests; `content_type` and user metadata are not persisted and come back
/// as `None` on reads.
#[derive(Debug)]
pub struct LocalClient {
    root: PathBuf,
}

impl LocalClient {
    /// Create a new local client rooted at `root`.
    ///
    /// The root directory is created if it does not exist.
    ///
    /// # Errors
    /// - Invalid path
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        Ok(Self { root })
    }

    /// Create a local client rooted at the directory named by
    /// `CIRRUS_LOCAL_ROOT`.
    ///
    /// # Errors
    /// - `InvalidConfiguration` when the variable is unset or empty
    pub fn from_env() -> Result<Self> {
        let root = std::env::var(LOCAL_ROOT_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "{LOCAL_ROOT_ENV} must be set to the local storage root directory"
                ))
            })?;
        Self::new(root)
    }

    /// Convert an object key to a filesystem path under the root.
    ///
    /// Rejects keys with `.` or `..` components so objects cannot escape
    /// the root directory.
    fn to_fs_path(&self, key: &ObjectKey) -> Result<PathBuf> {
        let mut fs_path = self.root.clone();
        for component in key.as_str().split('/') {
            if component.is_empty() || component == "." || component == ".." {
                return Err(Error::InvalidInput(format!(
                    "object key contains an invalid path component: {key}"
                )));
            }
            fs_path.push(component);
        }
        Ok(fs_path)
    }

    /// Convert a filesystem path back to the object key it stores.
    fn to_key(&self, fs_path: &Path) -> Result<ObjectKey> {
        let relative = fs_path
            .strip_prefix(&self.root)
            .map_err(|_| Error::InvalidInput(format!("path escapes root: {}", fs_path.display())))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        ObjectKey::new(key)
    }

    /// Create a descriptor from filesystem metadata.
    fn create_info(key: ObjectKey, fs_meta: &std::fs::Metadata) -> ObjectInfo {
        let modified: Option<DateTime<Utc>> = fs_meta.modified().ok().map(|t| t.into());
        let etag = modified.map(|m| format!("{}-{}", m.timestamp(), fs_meta.len()));

        ObjectInfo {
            key,
            size_bytes: Some(fs_meta.len()),
            etag,
            updated_at: modified,
            content_type: None,
            metadata: None,
        }
    }
}

#[async_trait]
impl StorageClient for LocalClient {
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &ObjectKey,
        _content_type: Option<&str>,
        _metadata: Option<HashMap<String, String>>,
    ) -> Result<ObjectInfo> {
        let fs_path = self.to_fs_path(key)?;

        if let Some(parent) = fs_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&fs_path, &data).await?;
        debug!("wrote {} bytes to {}", data.len(), fs_path.display());

        let fs_meta = fs::metadata(&fs_path).await?;
        Ok(Self::create_info(key.clone(), &fs_meta))
    }

    async fn download_bytes(&self, key: &ObjectKey) -> Result<Vec<u8>> {
        let fs_path = self.to_fs_path(key)?;
        fs::read(&fs_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("no object at key: {key}"))
            } else {
                Error::Io(e)
            }
        })
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let mut results = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let fs_meta = entry.metadata().await?;
                if fs_meta.is_dir() {
                    pending.push(path);
                } else {
                    let key = self.to_key(&path)?;
                    if key.as_str().starts_with(prefix) {
                        results.push(Self::create_info(key, &fs_meta));
                    }
                }
            }
        }

        Ok(results)
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        let fs_path = self.to_fs_path(key)?;
        fs::remove_file(&fs_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(format!("no object at key: {key}"))
            } else {
                Error::Io(e)
            }
        })
    }

    async fn head(&self, key: &ObjectKey) -> Result<Option<ObjectInfo>> {
        let fs_path = self.to_fs_path(key)?;
        match fs::metadata(&fs_path).await {
            Ok(fs_meta) if fs_meta.is_file() => {
                Ok(Some(Self::create_info(key.clone(), &fs_meta)))
            }
            // A directory is not an object.
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(s: &str) -> ObjectKey {
        ObjectKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trips() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();
        let data = b"local bytes".to_vec();

        let info = client
            .upload_bytes(data.clone(), &key("file.bin"), None, None)
            .await
            .unwrap();
        assert_eq!(info.size_bytes, Some(data.len() as u64));
        assert!(info.etag.is_some());

        assert_eq!(
            client.download_bytes(&key("file.bin")).await.unwrap(),
            data
        );
    }

    #[tokio::test]
    async fn test_nested_keys_create_directories() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();

        client
            .upload_bytes(vec![1], &key("a/b/c.txt"), None, None)
            .await
            .unwrap();

        assert!(dir.path().join("a/b/c.txt").is_file());
        assert_eq!(
            client.download_bytes(&key("a/b/c.txt")).await.unwrap(),
            vec![1]
        );
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_the_root() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();

        let result = client
            .upload_bytes(vec![1], &key("../escape.txt"), None, None)
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_objects_map_to_not_found() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();
        let missing = key("nope.txt");

        assert!(matches!(
            client.download_bytes(&missing).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            client.delete(&missing).await,
            Err(Error::NotFound(_))
        ));
        assert!(client.head(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_walks_nested_directories() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();

        client
            .upload_bytes(vec![1], &key("logs/a.log"), None, None)
            .await
            .unwrap();
        client
            .upload_bytes(vec![2], &key("logs/2026/b.log"), None, None)
            .await
            .unwrap();
        client
            .upload_bytes(vec![3], &key("data.bin"), None, None)
            .await
            .unwrap();

        let mut logs = client.list("logs/").await.unwrap();
        logs.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].key, key("logs/2026/b.log"));
        assert_eq!(logs[1].key, key("logs/a.log"));

        let all = client.list("").await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let client = LocalClient::new(dir.path()).unwrap();

        client
            .upload_bytes(vec![1], &key("gone.txt"), None, None)
            .await
            .unwrap();
        client.delete(&key("gone.txt")).await.unwrap();

        assert!(client.head(&key("gone.txt")).await.unwrap().is_none());
    }

    #[test]
    fn test_from_env_requires_the_root_variable() {
        // Runs in its own process-wide env slot; use a scoped remove/restore.
        let saved = std::env::var(LOCAL_ROOT_ENV).ok();
        std::env::remove_var(LOCAL_ROOT_ENV);

        let result = LocalClient::from_env();
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));

        if let Some(value) = saved {
            std::env::set_var(LOCAL_ROOT_ENV, value);
        }
    }
}
