//! Content storage for metadata images and descriptors
//!
//! Uploads are content addressed wherever the backend allows it, so
//! re-uploading identical bytes yields the same URI.

pub mod bundler;
pub mod local;
pub mod memory;

use async_trait::async_trait;

use crate::core::SdkResult;

pub use bundler::BundlerStorage;
pub use local::LocalStorage;
pub use memory::MemoryStorage;

#[async_trait]
pub trait ContentStorage: Send + Sync {
    /// Store `bytes` and return a URI that resolves to them
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SdkResult<String>;
}

/// Base58 SHA-256 of `bytes`
pub fn content_hash(bytes: &[u8]) -> String {
    solana_sdk::hash::hash(bytes).to_string()
}

/// File extension used for a MIME type
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "application/json" => "json",
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/svg+xml" => "svg",
        "image/webp" => "webp",
        _ => "bin",
    }
}

/// Best-effort MIME type from a file name
pub fn content_type_for_path(path: &std::path::Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}
