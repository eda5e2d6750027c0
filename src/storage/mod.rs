//! Content-addressed storage bindings
//!
//! The orchestrator only sees the [`StorageProvider`] trait: upload bytes, get a
//! CID back; list what was pinned before. `pinata` holds the concrete client.

pub mod pinata;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::Result;

#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Upload data and return the content identifier.
    async fn upload(&self, data: Vec<u8>, metadata: UploadMetadata) -> Result<String>;

    /// List previously uploaded files, newest first.
    async fn list(&self, page_limit: u32, page_offset: u32) -> Result<Vec<StoredFile>>;
}

#[derive(Clone, Debug)]
pub struct UploadMetadata {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub sha256: String,
}

impl UploadMetadata {
    /// Build metadata for a file payload, hashing the content.
    pub fn for_file(filename: impl Into<String>, data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self {
            filename: filename.into(),
            content_type: "application/octet-stream".to_string(),
            size: data.len(),
            sha256: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// A previously pinned file as reported by the listing API. Display only;
/// nothing is persisted locally.
#[derive(Clone, Debug, Deserialize)]
pub struct StoredFile {
    pub id: String,
    pub name: Option<String>,
    pub cid: String,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed File")
    }
}
