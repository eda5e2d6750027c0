//! Pinata pinning-service client
//!
//! Two endpoints are used: the legacy pinning API for uploads (key/secret header
//! auth) and the v3 files API for listing (bearer token). A structured `error`
//! field in a failed upload response is surfaced to the user verbatim.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::PinningConfig;
use crate::error::{Error, Result};
use crate::storage::{StorageProvider, StoredFile, UploadMetadata};

pub struct PinataProvider {
    client: reqwest::Client,
    config: PinningConfig,
}

impl PinataProvider {
    pub fn new(config: PinningConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn with_client(config: PinningConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    /// Gateway URL for a pinned CID, when a dedicated gateway is configured.
    pub fn gateway_url(&self, cid: &str) -> Option<String> {
        self.config
            .gateway_base
            .as_ref()
            .map(|base| format!("{}/ipfs/{cid}", base.trim_end_matches('/')))
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    files: Vec<StoredFile>,
}

#[async_trait::async_trait]
impl StorageProvider for PinataProvider {
    #[instrument(skip(self, data), fields(filename = %metadata.filename, size = metadata.size))]
    async fn upload(&self, data: Vec<u8>, metadata: UploadMetadata) -> Result<String> {
        let part = Part::bytes(data)
            .file_name(metadata.filename.clone())
            .mime_str(&metadata.content_type)
            .map_err(|e| Error::StorageUploadFailed(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.config.api_base))
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.api_secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::StorageUploadFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = match body.get("error") {
                Some(err) => err.to_string(),
                None => format!("upload failed with status {status}"),
            };
            return Err(Error::StorageUploadFailed(message));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| Error::StorageUploadFailed(format!("malformed pin response: {e}")))?;
        info!(cid = %pinned.ipfs_hash, "file pinned");
        Ok(pinned.ipfs_hash)
    }

    #[instrument(skip(self))]
    async fn list(&self, page_limit: u32, page_offset: u32) -> Result<Vec<StoredFile>> {
        let response = self
            .client
            .get(format!("{}/v3/files/public", self.config.api_base))
            .query(&[("pageLimit", page_limit), ("pageOffset", page_offset)])
            .bearer_auth(&self.config.jwt)
            .send()
            .await
            .map_err(|e| Error::StorageListFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::StorageListFailed(format!(
                "listing failed with status {}",
                response.status()
            )));
        }

        let listing: ListResponse = response
            .json()
            .await
            .map_err(|e| Error::StorageListFailed(format!("malformed listing response: {e}")))?;
        debug!(count = listing.data.files.len(), "fetched pinned files");
        Ok(listing.data.files)
    }
}
