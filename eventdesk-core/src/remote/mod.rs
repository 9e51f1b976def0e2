//! Remote content store access.
//!
//! The events file and uploaded images live in a GitHub repository and are
//! written through the contents API (`github`). The current list can also be
//! read from the published site (`site`).

pub mod github;
pub mod site;

use async_trait::async_trait;

use crate::error::EventDeskResult;

pub use github::GitHubContents;
pub use site::SiteClient;

/// Opaque version identifier of a stored file (the blob sha on GitHub).
///
/// Supplying it on write turns the write into an overwrite that the store
/// rejects if the file changed in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    pub fn new(sha: impl Into<String>) -> Self {
        Revision(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path-addressed store with optimistic-concurrency writes.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Current revision of `path`, or `None` if the file does not exist.
    async fn fetch_revision(&self, path: &str) -> EventDeskResult<Option<Revision>>;

    /// Write `bytes` to `path`. With a revision this overwrites that exact
    /// version; without one it creates the file.
    async fn write_object(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        revision: Option<&Revision>,
    ) -> EventDeskResult<()>;
}

/// Somewhere the published events file can be read from.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self, path: &str) -> EventDeskResult<Vec<u8>>;
}
