//! GitHub contents API client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::credentials::Credentials;
use crate::error::{EventDeskError, EventDeskResult};
use crate::remote::{ContentStore, EventSource, Revision};

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("eventdesk/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for `/repos/{owner}/{repo}/contents/{path}`.
pub struct GitHubContents {
    http: reqwest::Client,
    api_url: Url,
    credentials: Credentials,
}

/// The parts of a contents API file entry we read.
#[derive(Deserialize)]
struct ContentEntry {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

impl GitHubContents {
    pub fn new(api_url: &str, credentials: Credentials) -> EventDeskResult<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| EventDeskError::Config(format!("Invalid API URL '{api_url}': {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(EventDeskError::Config(format!(
                "Invalid API URL '{api_url}': not a base URL"
            )));
        }

        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(GitHubContents {
            http,
            api_url,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build the contents URL for `path`, percent-encoding each segment.
    fn contents_url(&self, path: &str) -> Url {
        let mut url = self.api_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([
                    "repos",
                    self.credentials.owner(),
                    self.credentials.repo(),
                    "contents",
                ])
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(self.credentials.token())
            .header(ACCEPT, ACCEPT_GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION)
    }

    /// GET the contents entry for `path`. `Ok(None)` means 404.
    async fn get_entry(&self, path: &str) -> EventDeskResult<Option<ContentEntry>> {
        let url = self.contents_url(path);
        debug!(%url, "GET contents");

        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EventDeskError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        if !status.is_success() {
            return Err(EventDeskError::UnexpectedStatus {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let entry = serde_json::from_str(&body).map_err(|e| {
            EventDeskError::Serialization(format!("Unexpected contents response for {path}: {e}"))
        })?;

        Ok(Some(entry))
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn fetch_revision(&self, path: &str) -> EventDeskResult<Option<Revision>> {
        let revision = self.get_entry(path).await?.map(|entry| Revision::new(entry.sha));
        debug!(path, revision = ?revision, "fetched revision");
        Ok(revision)
    }

    async fn write_object(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        revision: Option<&Revision>,
    ) -> EventDeskResult<()> {
        let url = self.contents_url(path);
        debug!(%url, bytes = bytes.len(), overwrite = revision.is_some(), "PUT contents");

        let body = PutContents {
            message,
            content: BASE64.encode(bytes),
            sha: revision.map(Revision::as_str),
        };

        let response = self.request(Method::PUT, url).json(&body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EventDeskError::Write {
                status: status.as_u16(),
                body,
            });
        }

        info!(path, audit = message, "wrote file to {}/{}", self.credentials.owner(), self.credentials.repo());
        Ok(())
    }
}

#[async_trait]
impl EventSource for GitHubContents {
    async fn fetch(&self, path: &str) -> EventDeskResult<Vec<u8>> {
        let entry = self
            .get_entry(path)
            .await?
            .ok_or_else(|| EventDeskError::NotFound {
                path: path.to_string(),
            })?;

        match (entry.encoding.as_deref(), entry.content) {
            (Some("base64"), Some(content)) => {
                // GitHub wraps the payload at 60 columns
                let compact: String = content.split_whitespace().collect();
                BASE64
                    .decode(compact)
                    .map_err(|e| EventDeskError::Load(format!("{path} has invalid content: {e}")))
            }
            _ => Err(EventDeskError::Load(format!(
                "{path} is too large to read through the contents API; set site_url instead"
            ))),
        }
    }
}
