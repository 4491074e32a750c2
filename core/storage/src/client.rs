//! Storage client trait definition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use cirrus_common::{Error, ObjectKey, Result};

/// Descriptor for a stored object.
///
/// An immutable snapshot of one object's metadata, constructed fresh by the
/// backend on every read. Has no identity beyond structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Key of the object within the backend.
    pub key: ObjectKey,
    /// Size in bytes, when the backend reports one.
    pub size_bytes: Option<u64>,
    /// ETag or revision ID assigned by the backend.
    pub etag: Option<String>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
    /// MIME content type, when known.
    pub content_type: Option<String>,
    /// Backend-stored user metadata.
    pub metadata: Option<HashMap<String, String>>,
}

impl ObjectInfo {
    /// Create a descriptor with only the key set.
    pub fn new(key: ObjectKey) -> Self {
        Self {
            key,
            size_bytes: None,
            etag: None,
            updated_at: None,
            content_type: None,
            metadata: None,
        }
    }
}

/// Storage client trait for object storage backends.
///
/// All operations are async. Implementations must handle their own
/// authentication and rate limiting; retry policy also belongs to the
/// implementation layer, never to callers of this trait.
#[async_trait]
pub trait StorageClient: std::fmt::Debug + Send + Sync {
    /// Upload a file from the local filesystem.
    ///
    /// Reads the file into memory and delegates to [`upload_bytes`].
    ///
    /// # Errors
    /// - `NotFound` if the file at `local_path` is missing or unreadable
    ///
    /// [`upload_bytes`]: StorageClient::upload_bytes
    async fn upload_file(
        &self,
        local_path: &Path,
        key: &ObjectKey,
        content_type: Option<&str>,
    ) -> Result<ObjectInfo> {
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            Error::NotFound(format!(
                "cannot read local file {}: {e}",
                local_path.display()
            ))
        })?;
        self.upload_bytes(data, key, content_type, None).await
    }

    /// Upload bytes to the backend.
    ///
    /// # Postconditions
    /// - Object is created or overwritten at `key`
    /// - Returned descriptor reflects the persisted object, including any
    ///   backend-assigned `etag` and `updated_at`
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &ObjectKey,
        content_type: Option<&str>,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<ObjectInfo>;

    /// Download an object as bytes.
    ///
    /// # Errors
    /// - `NotFound` if no object exists at `key`
    async fn download_bytes(&self, key: &ObjectKey) -> Result<Vec<u8>>;

    /// List objects whose key starts with `prefix`.
    ///
    /// Returns an empty vector when nothing matches. Ordering is
    /// backend-defined and not guaranteed.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>>;

    /// Delete an object.
    ///
    /// # Errors
    /// - `NotFound` if no object exists at `key`
    async fn delete(&self, key: &ObjectKey) -> Result<()>;

    /// Get an object's descriptor without transferring its body.
    ///
    /// Returns `Ok(None)` when the key does not exist. This is the one
    /// operation where absence is a normal outcome, not an error.
    async fn head(&self, key: &ObjectKey) -> Result<Option<ObjectInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryClient;
    use std::io::Write;

    #[test]
    fn test_object_info_serialization() {
        let mut info = ObjectInfo::new(ObjectKey::new("test/file.txt").unwrap());
        info.size_bytes = Some(1024);
        info.etag = Some("abc123".to_string());
        info.updated_at = Some(Utc::now());
        info.content_type = Some("text/plain".to_string());

        let json = serde_json::to_string(&info).unwrap();
        let deserialized: ObjectInfo = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, info);
    }

    #[tokio::test]
    async fn test_upload_file_delegates_to_upload_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file contents").unwrap();

        let client = MemoryClient::new();
        let key = ObjectKey::new("uploaded.txt").unwrap();
        let info = client
            .upload_file(file.path(), &key, Some("text/plain"))
            .await
            .unwrap();

        assert_eq!(info.key, key);
        assert_eq!(info.size_bytes, Some(13));
        assert_eq!(info.content_type.as_deref(), Some("text/plain"));
        assert_eq!(
            client.download_bytes(&key).await.unwrap(),
            b"file contents".to_vec()
        );
    }

    #[tokio::test]
    async fn test_upload_file_missing_path_is_not_found() {
        let client = MemoryClient::new();
        let key = ObjectKey::new("missing.txt").unwrap();
        let result = client
            .upload_file(Path::new("/no/such/file"), &key, None)
            .await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_upload_file_unreadable_path_is_not_found() {
        // A directory exists but cannot be read as a file; any read failure
        // maps to NotFound, not just a missing path.
        let dir = tempfile::TempDir::new().unwrap();

        let client = MemoryClient::new();
        let key = ObjectKey::new("unreadable.txt").unwrap();
        let result = client.upload_file(dir.path(), &key, None).await;

        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
