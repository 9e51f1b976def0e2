//! Read-only access to the published site.

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use tracing::debug;
use url::Url;

use crate::error::{EventDeskError, EventDeskResult};
use crate::remote::EventSource;

/// Unauthenticated reader for files served by the public site.
pub struct SiteClient {
    http: reqwest::Client,
    base_url: Url,
}

impl SiteClient {
    pub fn new(site_url: &str) -> EventDeskResult<Self> {
        let mut base_url = Url::parse(site_url)
            .map_err(|e| EventDeskError::Config(format!("Invalid site URL '{site_url}': {e}")))?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(SiteClient {
            http: reqwest::Client::new(),
            base_url,
        })
    }
}

#[async_trait]
impl EventSource for SiteClient {
    async fn fetch(&self, path: &str) -> EventDeskResult<Vec<u8>> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| EventDeskError::Load(format!("Invalid path '{path}': {e}")))?;
        debug!(%url, "GET published file");

        let response = self
            .http
            .get(url.clone())
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| EventDeskError::Load(format!("Could not reach {url}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EventDeskError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(EventDeskError::Load(format!("{url} returned {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EventDeskError::Load(format!("Could not read {url}: {e}")))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_reads_relative_to_site_root() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/school/events.json");
                then.status(200).body("[]");
            })
            .await;

        let site = SiteClient::new(&server.url("/school")).unwrap();
        let bytes = site.fetch("events.json").await.unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, b"[]");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events.json");
                then.status(404);
            })
            .await;

        let site = SiteClient::new(&server.base_url()).unwrap();
        let err = site.fetch("events.json").await.unwrap_err();
        assert!(matches!(err, EventDeskError::NotFound { ref path } if path == "events.json"));
    }

    #[tokio::test]
    async fn test_server_error_is_load_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/events.json");
                then.status(500);
            })
            .await;

        let site = SiteClient::new(&server.base_url()).unwrap();
        let err = site.fetch("events.json").await.unwrap_err();
        assert!(matches!(err, EventDeskError::Load(_)));
    }
}
