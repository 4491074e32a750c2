//! In-memory storage client for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use cirrus_common::{Error, ObjectKey, Result};

use crate::client::{ObjectInfo, StorageClient};

/// Stored object: body plus the descriptor handed back on reads.
#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    info: ObjectInfo,
}

/// In-memory storage client.
///
/// Useful for testing and development. All data is stored in memory and
/// lost on drop. Every write assigns a fresh etag and timestamp, matching
/// what a real backend reports after a put.
#[derive(Debug)]
pub struct MemoryClient {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryClient {
    /// Create a new empty memory client.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageClient for MemoryClient {
    async fn upload_bytes(
        &self,
        data: Vec<u8>,
        key: &ObjectKey,
        content_type: Option<&str>,
        metadata: Option<HashMap<String, String>>,
    ) -> Result<ObjectInfo> {
        let info = ObjectInfo {
            key: key.clone(),
            size_bytes: Some(data.len() as u64),
            etag: Some(Uuid::new_v4().to_string()),
            updated_at: Some(Utc::now()),
            content_type: content_type.map(str::to_string),
            metadata,
        };

        let stored = StoredObject {
            data,
            info: info.clone(),
        };
        self.objects
            .write()
            .unwrap()
            .insert(key.as_str().to_string(), stored);

        Ok(info)
    }

    async fn download_bytes(&self, key: &ObjectKey) -> Result<Vec<u8>> {
        let objects = self.objects.read().unwrap();
        match objects.get(key.as_str()) {
            Some(stored) => Ok(stored.data.clone()),
            None => Err(Error::NotFound(format!("no object at key: {key}"))),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectInfo>> {
        let objects = self.objects.read().unwrap();
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, stored)| stored.info.clone())
            .collect())
    }

    async fn delete(&self, key: &ObjectKey) -> Result<()> {
        let mut objects = self.objects.write().unwrap();
        match objects.remove(key.as_str()) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound(format!("no object at key: {key}"))),
        }
    }

    async fn head(&self, key: &ObjectKey) -> Result<Option<ObjectInfo>> {
        let objects = self.objects.read().unwrap();
        Ok(objects.get(key.as_str()).map(|stored| stored.info.clone()))
    }
}
