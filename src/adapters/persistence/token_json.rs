//! Implements TokenStorePort using a JSON file.
//!
//! Holds the single current credential under a fixed key; the file is the durable copy.

use crate::domain::{Credential, DomainError};
use crate::ports::TokenStorePort;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// On-disk layout: `{"salesforce_credential": {...}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct TokenData {
    #[serde(default)]
    salesforce_credential: Option<Credential>,
}

/// JSON file-based token storage.
pub struct JsonTokenStore {
    path: PathBuf,
    cache: tokio::sync::RwLock<TokenData>,
}

impl JsonTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(TokenData::default()),
        }
    }

    /// Load the stored credential from disk. A missing or unreadable file means "no credential".
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "token file unreadable, ignoring");
                TokenData::default()
            }),
            Err(_) => TokenData::default(),
        };
        debug!(
            path = %self.path.display(),
            present = data.salesforce_credential.is_some(),
            "token store loaded"
        );
        *self.cache.write().await = data;
        Ok(())
    }

    /// Write-replace: temp file, fsync, rename over the target.
    async fn save(&self) -> Result<(), DomainError> {
        let data = self.cache.read().await;
        let json = serde_json::to_string_pretty(&*data)
            .map_err(|e| DomainError::TokenStore(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::TokenStore(format!("create token dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::TokenStore(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::TokenStore(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::TokenStore(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::TokenStore(format!("atomic rename failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl TokenStorePort for JsonTokenStore {
    async fn get(&self) -> Result<Option<Credential>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.salesforce_credential.clone())
    }

    async fn put(&self, credential: &Credential) -> Result<(), DomainError> {
        {
            let mut cache = self.cache.write().await;
            cache.salesforce_credential = Some(credential.clone());
        }
        self.save().await
    }
}
