use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{content_hash, ContentStorage};
use crate::core::{SdkError, SdkResult};

struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// Process-local storage with `memory://<hash>` URIs
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, StoredObject>>,
    unavailable: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject uploads with a storage error while set
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get(&self, uri: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .map(|object| object.bytes.clone())
    }

    pub fn content_type(&self, uri: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .map(|object| object.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ContentStorage for MemoryStorage {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SdkResult<String> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SdkError::Storage("memory storage is unavailable".to_string()));
        }

        let uri = format!("memory://{}", content_hash(&bytes));
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                uri.clone(),
                StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                },
            );
        Ok(uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_is_content_addressed() {
        let storage = MemoryStorage::new();
        let first = storage.upload(b"logo".to_vec(), "image/png").await.unwrap();
        let second = storage.upload(b"logo".to_vec(), "image/png").await.unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with("memory://"));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(&first).unwrap(), b"logo");
        assert_eq!(storage.content_type(&first).as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_unavailable_storage() {
        let storage = MemoryStorage::new();
        storage.set_unavailable(true);
        let result = storage.upload(b"logo".to_vec(), "image/png").await;
        assert!(matches!(result, Err(SdkError::Storage(_))));
        assert!(storage.is_empty());
    }
}
