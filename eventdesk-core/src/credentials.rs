//! Per-action GitHub credentials.

use crate::error::{EventDeskError, EventDeskResult};

const MISSING_SETTINGS: &str = "GitHub settings required.";

/// Token and target repository for one action. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    token: String,
    owner: String,
    repo: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish()
    }
}

impl Credentials {
    /// Trim all three values and reject the set if any is missing or blank.
    pub fn new(
        token: Option<&str>,
        owner: Option<&str>,
        repo: Option<&str>,
    ) -> EventDeskResult<Self> {
        let field = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| EventDeskError::Validation(MISSING_SETTINGS.to_string()))
        };

        Ok(Credentials {
            token: field(token)?,
            owner: field(owner)?,
            repo: field(repo)?,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}
