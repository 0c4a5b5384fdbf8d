use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{content_hash, extension_for, ContentStorage};
use crate::{core::SdkResult, identity::expand_home};

/// Content-addressed directory on the local filesystem
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: &str) -> SdkResult<Self> {
        Ok(Self {
            root: expand_home(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ContentStorage for LocalStorage {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SdkResult<String> {
        tokio::fs::create_dir_all(&self.root).await?;
        let root = tokio::fs::canonicalize(&self.root).await?;

        let name = format!("{}.{}", content_hash(&bytes), extension_for(content_type));
        let path = root.join(name);
        tokio::fs::write(&path, &bytes).await?;

        debug!("stored {} bytes at {}", bytes.len(), path.display());
        Ok(format!("file://{}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("assets").to_str().unwrap()).unwrap();

        let uri = storage
            .upload(br#"{"name":"JTE"}"#.to_vec(), "application/json")
            .await
            .unwrap();

        let path = uri.strip_prefix("file://").unwrap();
        assert!(path.ends_with(".json"));
        assert_eq!(std::fs::read(path).unwrap(), br#"{"name":"JTE"}"#);

        let again = storage
            .upload(br#"{"name":"JTE"}"#.to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(uri, again);
    }
}
