//! Credential acquisition: reuse the cached credential or log in and cache the new one.
//!
//! Re-authentication only happens when nothing usable is cached. A token the server has
//! already expired is still used as-is.

use crate::domain::{Credential, DomainError};
use crate::ports::{AuthPort, TokenStorePort};
use std::sync::Arc;
use tracing::{info, warn};

pub struct AuthService {
    auth: Arc<dyn AuthPort>,
    tokens: Arc<dyn TokenStorePort>,
}

impl AuthService {
    pub fn new(auth: Arc<dyn AuthPort>, tokens: Arc<dyn TokenStorePort>) -> Self {
        Self { auth, tokens }
    }

    /// Usable cached credential, if any. A failing store is treated as empty.
    pub async fn cached_credential(&self) -> Option<Credential> {
        match self.tokens.get().await {
            Ok(Some(c)) if c.is_usable() => Some(c),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "token store read failed; treating as empty");
                None
            }
        }
    }

    /// One login attempt. On success the credential is written back to the store.
    pub async fn login(&self) -> Result<Credential, DomainError> {
        let credential = self.auth.login().await?;
        if !credential.is_usable() {
            return Err(DomainError::Auth("login returned no usable access token".into()));
        }
        info!(instance_url = %credential.instance_url, "login successful, token retrieved");
        if let Err(e) = self.tokens.put(&credential).await {
            warn!(error = %e, "failed to persist credential; continuing with in-memory token");
        }
        Ok(credential)
    }

    /// Cached credential, or a fresh one from `login`.
    pub async fn acquire(&self) -> Result<Credential, DomainError> {
        if let Some(c) = self.cached_credential().await {
            return Ok(c);
        }
        info!("no valid token found, initiating login");
        self.login().await
    }
}
