//! Application configuration. OAuth grant, CRM endpoint, device, paths.

use crate::domain::{DomainError, ExternalIdMode};
use serde::Deserialize;
use std::fmt;

/// Salesforce production token endpoint.
pub const DEFAULT_LOGIN_URL: &str = "https://login.salesforce.com/services/oauth2/token";

/// REST path of the custom object that receives forwarded messages.
pub const DEFAULT_RESOURCE_PATH: &str = "/services/data/v62.0/sobjects/FinPlan__SMS_Message__c";

pub const DEFAULT_DEVICE_NAME: &str = "sms-forwarder";

pub const DEFAULT_TOKEN_PATH: &str = "./data/token.json";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// OAuth token endpoint. Read from SMSFWD_LOGIN_URL.
    #[serde(default)]
    pub login_url: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Password grant
    // ─────────────────────────────────────────────────────────────────────────
    /// Connected app consumer key. Read from SMSFWD_CLIENT_ID.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Connected app consumer secret. Read from SMSFWD_CLIENT_SECRET.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Integration user. Read from SMSFWD_USERNAME.
    #[serde(default)]
    pub username: Option<String>,

    /// Integration user password. Read from SMSFWD_PASSWORD.
    #[serde(default)]
    pub password: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Forwarding
    // ─────────────────────────────────────────────────────────────────────────
    /// Path appended to the instance URL for record creation. Read from SMSFWD_RESOURCE_PATH.
    #[serde(default)]
    pub resource_path: Option<String>,

    /// Value sent in the device field. Read from SMSFWD_DEVICE_NAME.
    #[serde(default)]
    pub device_name: Option<String>,

    /// `legacy` (default) or `literal`. Read from SMSFWD_EXTERNAL_ID_MODE.
    #[serde(default)]
    pub external_id_mode: Option<String>,

    /// Extra lowercase classifier markers, comma separated. Read from SMSFWD_EXTRA_MARKERS.
    #[serde(default)]
    pub extra_markers: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Storage / startup
    // ─────────────────────────────────────────────────────────────────────────
    /// Persisted credential file. Read from SMSFWD_TOKEN_PATH.
    #[serde(default)]
    pub token_path: Option<String>,

    /// Authenticate once at startup before any batch arrives. Read from SMSFWD_LOGIN_ON_START.
    #[serde(default)]
    pub login_on_start: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("SMSFWD"));
        if let Ok(path) = std::env::var("SMSFWD_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn login_url_or_default(&self) -> String {
        self.login_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LOGIN_URL.to_string())
    }

    pub fn resource_path_or_default(&self) -> String {
        self.resource_path
            .clone()
            .unwrap_or_else(|| DEFAULT_RESOURCE_PATH.to_string())
    }

    pub fn device_name_or_default(&self) -> String {
        self.device_name
            .clone()
            .unwrap_or_else(|| DEFAULT_DEVICE_NAME.to_string())
    }

    pub fn token_path_or_default(&self) -> String {
        self.token_path
            .clone()
            .unwrap_or_else(|| DEFAULT_TOKEN_PATH.to_string())
    }

    /// Defaults to true: the app logs in as soon as it is ready.
    pub fn login_on_start_or_default(&self) -> bool {
        self.login_on_start.unwrap_or(true)
    }

    /// Unset means `Legacy`; an unknown value is a configuration error.
    pub fn external_id_mode(&self) -> Result<ExternalIdMode, DomainError> {
        match self.external_id_mode.as_deref() {
            None => Ok(ExternalIdMode::default()),
            Some(raw) => ExternalIdMode::parse(raw).ok_or_else(|| {
                DomainError::Config(format!(
                    "SMSFWD_EXTERNAL_ID_MODE must be 'legacy' or 'literal', got '{}'",
                    raw
                ))
            }),
        }
    }

    pub fn extra_markers(&self) -> Vec<String> {
        self.extra_markers
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect()
    }

    /// Returns the password grant, or names the first missing key.
    pub fn grant(&self) -> Result<PasswordGrant, DomainError> {
        fn required(value: &Option<String>, key: &str) -> Result<String, DomainError> {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| DomainError::Config(format!("Set {} (env or .env)", key)))
        }
        Ok(PasswordGrant {
            login_url: self.login_url_or_default(),
            client_id: required(&self.client_id, "SMSFWD_CLIENT_ID")?,
            client_secret: required(&self.client_secret, "SMSFWD_CLIENT_SECRET")?,
            username: required(&self.username, "SMSFWD_USERNAME")?,
            password: required(&self.password, "SMSFWD_PASSWORD")?,
        })
    }
}

/// Parameters of the OAuth 2.0 resource-owner password grant.
#[derive(Clone)]
pub struct PasswordGrant {
    pub login_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for PasswordGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordGrant")
            .field("login_url", &self.login_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
