//! Source of the externally assigned session identifier.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};

use crate::configuration::types::SessionSourceConfig;
use crate::error_handling::types::SessionSourceError;
use crate::session_management::session::SessionKey;

#[async_trait]
pub trait SessionSource: Send + Sync {
    /// Fetches the identifier of the session that should be captured now.
    async fn fetch(&self) -> Result<SessionKey, SessionSourceError>;
}

/// Polls a control endpoint answering `{"<field>": "<session id>", ...}`.
pub struct HttpSessionSource {
    http: reqwest::Client,
    url: String,
    field: String,
}

impl HttpSessionSource {
    pub fn new(config: &SessionSourceConfig) -> Result<Self, SessionSourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SessionSourceError::Request(e.to_string()))?;
        Ok(Self {
            http,
            url: config.url.clone(),
            field: config.field.clone(),
        })
    }
}

#[async_trait]
impl SessionSource for HttpSessionSource {
    async fn fetch(&self) -> Result<SessionKey, SessionSourceError> {
        debug!("Fetching session identifier from {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SessionSourceError::Request(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(SessionSourceError::Status(status.as_u16()));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SessionSourceError::Payload(e.to_string()))?;
        debug!("Session source response: {}", payload);

        let raw = payload
            .get(&self.field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SessionSourceError::Payload(format!("missing string field '{}'", self.field))
            })?;
        let key = SessionKey::parse(raw)?;
        info!("Session identifier: {}", key);
        Ok(key)
    }
}
