//! Implements AuthPort with the OAuth 2.0 password grant.
//!
//! POSTs the form-encoded grant to the token endpoint and maps the JSON answer to a Credential.

use crate::domain::{Credential, DomainError};
use crate::ports::AuthPort;
use crate::shared::config::PasswordGrant;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Successful token response. Other fields (id, signature, issued_at...) are ignored.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    instance_url: Option<String>,
}

/// RFC 6749 §5.2 error body.
#[derive(Deserialize)]
struct TokenError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Password-grant auth adapter. One HTTP exchange per `login`.
pub struct PasswordGrantAuthAdapter {
    client: reqwest::Client,
    grant: PasswordGrant,
}

impl PasswordGrantAuthAdapter {
    pub fn new(grant: PasswordGrant) -> Self {
        Self::with_client(reqwest::Client::new(), grant)
    }

    pub fn with_client(client: reqwest::Client, grant: PasswordGrant) -> Self {
        Self { client, grant }
    }

    fn error_message(status: reqwest::StatusCode, body: &str) -> String {
        match serde_json::from_str::<TokenError>(body) {
            Ok(e) => match e.error_description {
                Some(desc) => format!("{}: {}", e.error, desc),
                None => e.error,
            },
            Err(_) => format!(
                "token endpoint returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ),
        }
    }
}

#[async_trait]
impl AuthPort for PasswordGrantAuthAdapter {
    async fn login(&self) -> Result<Credential, DomainError> {
        info!(
            url = %self.grant.login_url,
            username = %self.grant.username,
            "requesting token (password grant)"
        );

        let form = [
            ("grant_type", "password"),
            ("client_id", self.grant.client_id.as_str()),
            ("client_secret", self.grant.client_secret.as_str()),
            ("username", self.grant.username.as_str()),
            ("password", self.grant.password.as_str()),
        ];

        let response = self
            .client
            .post(&self.grant.login_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| DomainError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Auth(format!("read token response: {}", e)))?;

        if !status.is_success() {
            let message = Self::error_message(status, &body);
            warn!(status = %status, error = %message, "token endpoint rejected login");
            return Err(DomainError::Auth(message));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| DomainError::Auth(format!("parse token response: {}", e)))?;

        let credential = Credential::new(
            token.access_token.unwrap_or_default(),
            token.instance_url.unwrap_or_default(),
        );
        if !credential.is_usable() {
            return Err(DomainError::Auth("token response has no access_token".into()));
        }
        if credential.instance_url.is_empty() {
            return Err(DomainError::Auth("token response has no instance_url".into()));
        }

        debug!(instance_url = %credential.instance_url, "token obtained");
        Ok(credential)
    }
}
