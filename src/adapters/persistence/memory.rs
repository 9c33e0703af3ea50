//! In-memory token store. Nothing survives the process; used for dry runs and tests.

use crate::domain::{Credential, DomainError};
use crate::ports::TokenStorePort;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a credential already cached.
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait::async_trait]
impl TokenStorePort for MemoryTokenStore {
    async fn get(&self) -> Result<Option<Credential>, DomainError> {
        Ok(self.slot.read().await.clone())
    }

    async fn put(&self, credential: &Credential) -> Result<(), DomainError> {
        *self.slot.write().await = Some(credential.clone());
        Ok(())
    }
}
