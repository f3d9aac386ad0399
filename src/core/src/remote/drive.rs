//! HTTP adapter for a Drive-v3 style remote store.
//!
//! Talks to three endpoints only: folder listing, metadata-only create and
//! multipart create. The bearer token is read once from a pre-provisioned
//! credentials file; obtaining or refreshing it is outside this crate.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error_handling::types::RemoteError;
use crate::remote::client::{RemoteStorage, FOLDER_MEDIA_TYPE};
use crate::remote::types::{RemoteEntry, RemoteId};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteEntry>,
}

#[derive(Deserialize)]
struct CreatedFile {
    id: RemoteId,
}

#[derive(Deserialize)]
struct StoredToken {
    token: Option<String>,
    access_token: Option<String>,
}

pub struct DriveClient {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl DriveClient {
    pub fn new(api_base: &str, access_token: String, timeout: Duration) -> Result<Self, RemoteError> {
        if access_token.trim().is_empty() {
            return Err(RemoteError::Credentials("empty access token".into()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Builds a client from a token file holding `token` or `access_token`.
    pub fn from_token_file(
        api_base: &str,
        path: &Path,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RemoteError::Credentials(format!("cannot read {}: {}", path.display(), e))
        })?;
        let stored: StoredToken = serde_json::from_str(&raw).map_err(|e| {
            RemoteError::Credentials(format!("invalid token file {}: {}", path.display(), e))
        })?;
        let token = stored.token.or(stored.access_token).ok_or_else(|| {
            RemoteError::Credentials(format!("no access token in {}", path.display()))
        })?;
        debug!("Loaded remote credentials from {}", path.display());
        Self::new(api_base, token, timeout)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    async fn send<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = request.header(AUTHORIZATION, self.bearer()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body = response.text().await?;
        trace!("Remote response: {}", body);
        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

/// Quotes a value for use inside a single-quoted query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn folder_query(name: &str, parent: &RemoteId) -> String {
    format!(
        "mimeType='{}' and name='{}' and '{}' in parents and trashed=false",
        FOLDER_MEDIA_TYPE,
        escape_query_literal(name),
        escape_query_literal(parent.as_str())
    )
}

/// Assembles a `multipart/related` body: JSON metadata followed by the media.
fn multipart_related(metadata: &serde_json::Value, media_type: &str, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = format!("camsync-{}", Uuid::new_v4().simple());
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    (format!("multipart/related; boundary={}", boundary), body)
}

#[async_trait]
impl RemoteStorage for DriveClient {
    async fn find_folders(
        &self,
        name: &str,
        parent: &RemoteId,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        let query = folder_query(name, parent);
        debug!("Listing remote folders: {}", query);
        let request = self
            .http
            .get(format!("{}/drive/v3/files", self.api_base))
            .query(&[
                ("q", query.as_str()),
                ("pageSize", "10"),
                ("fields", "nextPageToken, files(id, name)"),
            ]);
        let list: FileList = self.send(request).await?;
        Ok(list.files)
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> Result<RemoteId, RemoteError> {
        let mut body = json!({ "name": name, "mimeType": FOLDER_MEDIA_TYPE });
        if let Some(parent) = parent {
            body["parents"] = json!([parent]);
        }
        let request = self
            .http
            .post(format!("{}/drive/v3/files", self.api_base))
            .query(&[("fields", "id")])
            .json(&body);
        let created: CreatedFile = self.send(request).await?;
        Ok(created.id)
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        media_type: &str,
        content: Vec<u8>,
    ) -> Result<RemoteId, RemoteError> {
        let metadata = json!({ "name": name, "parents": [parent] });
        let (content_type, body) = multipart_related(&metadata, media_type, &content);
        let request = self
            .http
            .post(format!("{}/upload/drive/v3/files", self.api_base))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(CONTENT_TYPE, content_type)
            .body(body);
        let created: CreatedFile = self.send(request).await?;
        Ok(created.id)
    }
}
