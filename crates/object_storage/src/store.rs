use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

/// Errors raised by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Uploads never overwrite an existing object.
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    /// The backend refused the request.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Transport failure reaching the backend.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Write-once image bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `bytes` under `key` and returns the object's public URL.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// Removes the object at `key`.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Public URL of the object at `key`.
    fn public_url(&self, key: &str) -> String;
}

fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Storage REST API client (`/object/{bucket}/{key}`).
pub struct HttpObjectStore {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl HttpObjectStore {
    /// Creates a client for `bucket` on the storage API at `base_url`.
    pub fn new(base_url: &str, service_key: String, bucket: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            bucket,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, encode_key(key))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        log::debug!("Uploading {} ({} bytes) to {}", key, bytes.len(), self.bucket);

        let response = self
            .client
            .post(self.object_url(key))
            .bearer_auth(&self.service_key)
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("❌ Upload of {} failed ({}): {}", key, status, body);
            return Err(StorageError::Backend(format!("{}: {}", status, body)));
        }

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.object_url(key))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StorageError::Backend(format!(
                "Failed to delete {}: {}",
                key,
                response.status()
            )));
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.base_url,
            self.bucket,
            encode_key(key)
        )
    }
}

/// In-process bucket for local development and tests.
pub struct MemoryObjectStore {
    base_url: String,
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryObjectStore {
    /// Creates an empty bucket whose public URLs start with `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    /// Keys currently stored, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Content type and bytes stored under `key`.
    pub fn get(&self, key: &str) -> Option<(String, Vec<u8>)> {
        self.objects
            .lock()
            .ok()
            .and_then(|objects| objects.get(key).cloned())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("bucket lock poisoned".to_string()))?;

        if objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }
        objects.insert(key.to_string(), (content_type.to_string(), bytes));

        Ok(self.public_url(key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Backend("bucket lock poisoned".to_string()))?;
        objects.remove(key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, encode_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_is_write_once() {
        let store = MemoryObjectStore::new("https://cdn.example.com/camp-images/");
        let url = store
            .upload("sub/1-0.jpg", vec![1, 2, 3], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.example.com/camp-images/sub/1-0.jpg");
        assert!(matches!(
            store.upload("sub/1-0.jpg", vec![4], "image/jpeg").await,
            Err(StorageError::AlreadyExists(_))
        ));

        store.delete("sub/1-0.jpg").await.unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn test_http_public_url_encodes_segments() {
        let store = HttpObjectStore::new(
            "https://storage.example.com/",
            "key".to_string(),
            "camp-images".to_string(),
        );
        assert_eq!(
            store.public_url("a b/1-0.png"),
            "https://storage.example.com/object/public/camp-images/a%20b/1-0.png"
        );
    }
}
