//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Credential, CrmPayload, DomainError};

/// OAuth login. One attempt per call, no retry.
#[async_trait::async_trait]
pub trait AuthPort: Send + Sync {
    /// Exchange the configured credentials for a fresh session.
    ///
    /// A response without a usable access token is an `Auth` error.
    async fn login(&self) -> Result<Credential, DomainError>;
}

/// Persistent cache of the last obtained credential.
#[async_trait::async_trait]
pub trait TokenStorePort: Send + Sync {
    /// Returns the stored credential, if any. Does not check usability or expiry.
    async fn get(&self) -> Result<Option<Credential>, DomainError>;

    /// Replace the stored credential.
    async fn put(&self, credential: &Credential) -> Result<(), DomainError>;
}

/// Raw answer of the CRM to one record POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmResponse {
    pub status: u16,
    pub body: String,
}

/// CRM REST gateway. One request per record; no connection state is shared across calls.
#[async_trait::async_trait]
pub trait CrmGateway: Send + Sync {
    /// POST one payload. Any HTTP status is `Ok`; only transport failures are `Err`.
    async fn create_record(
        &self,
        credential: &Credential,
        payload: &CrmPayload,
    ) -> Result<CrmResponse, DomainError>;
}
