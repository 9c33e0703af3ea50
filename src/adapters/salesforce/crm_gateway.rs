//! Salesforce REST adapter. Implements CrmGateway by creating one sObject record per call.

use crate::domain::{Credential, CrmPayload, DomainError};
use crate::ports::{CrmGateway, CrmResponse};
use async_trait::async_trait;
use tracing::debug;

/// Creates records under `{instance_url}{resource_path}`.
pub struct SalesforceCrmGateway {
    client: reqwest::Client,
    resource_path: String,
}

impl SalesforceCrmGateway {
    /// `resource_path` is e.g. `/services/data/v62.0/sobjects/FinPlan__SMS_Message__c`.
    pub fn new(resource_path: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), resource_path)
    }

    pub fn with_client(client: reqwest::Client, resource_path: impl Into<String>) -> Self {
        Self {
            client,
            resource_path: resource_path.into(),
        }
    }

    /// Join instance URL and resource path with exactly one `/` between them.
    fn record_url(&self, instance_url: &str) -> String {
        format!(
            "{}/{}",
            instance_url.trim_end_matches('/'),
            self.resource_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl CrmGateway for SalesforceCrmGateway {
    async fn create_record(
        &self,
        credential: &Credential,
        payload: &CrmPayload,
    ) -> Result<CrmResponse, DomainError> {
        let url = self.record_url(&credential.instance_url);
        let body =
            serde_json::to_vec(payload).map_err(|e| DomainError::Payload(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credential.access_token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| DomainError::Transport(format!("POST {}: {}", url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Transport(format!("read response body: {}", e)))?;
        debug!(status, url = %url, "CRM responded");

        Ok(CrmResponse { status, body })
    }
}
