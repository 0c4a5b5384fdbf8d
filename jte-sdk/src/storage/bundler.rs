//! Upload over HTTP to an Arweave-style upload proxy
//!
//! Content is POSTed unsigned to `{endpoint}/tx` and the `{"id": ...}` reply
//! is resolved against the gateway. Signing ANS-104 data items is out of
//! scope: public Bundlr/Irys nodes reject these uploads, so the endpoint
//! must be a proxy that signs (or stores) on our behalf.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::ContentStorage;
use crate::core::{SdkError, SdkResult};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

/// Posts raw content to an upload proxy and returns gateway URIs
pub struct BundlerStorage {
    endpoint: String,
    gateway: String,
    agent: ureq::Agent,
}

impl BundlerStorage {
    pub fn new(endpoint: &str, gateway: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(60))
            .build();

        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            gateway: gateway.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn uri_for(&self, id: &str) -> String {
        format!("{}/{}", self.gateway, id)
    }
}

#[async_trait]
impl ContentStorage for BundlerStorage {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> SdkResult<String> {
        let size = bytes.len();

        // ureq is blocking
        let response = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = format!("{}/tx", self.endpoint);
            let content_type = content_type.to_string();

            move || {
                let response = agent
                    .post(&url)
                    .set("Content-Type", &content_type)
                    .send_bytes(&bytes)?;
                let body: UploadResponse = response.into_json()?;
                Ok::<UploadResponse, SdkError>(body)
            }
        })
        .await
        .map_err(|e| SdkError::Storage(format!("upload task failed: {}", e)))??;

        let uri = self.uri_for(&response.id);
        info!("Uploaded {} bytes to {}", size, uri);
        Ok(uri)
    }
}
