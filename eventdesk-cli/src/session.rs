//! Resolves settings and loads the event list for one invocation.

use anyhow::Result;
use eventdesk_core::config::EventDeskConfig;
use eventdesk_core::credentials::Credentials;
use eventdesk_core::remote::{GitHubContents, SiteClient};
use eventdesk_core::{EventManager, EventRecord, read_events};
use owo_colors::OwoColorize;
use tracing::debug;

use crate::RepoArgs;
use crate::utils::tui;

pub struct Session {
    pub config: EventDeskConfig,
    pub manager: EventManager<GitHubContents>,
}

/// Owner and repo from flags/env, falling back to the config file.
pub fn resolve_repo<'a>(
    args: &'a RepoArgs,
    config: &'a EventDeskConfig,
) -> (Option<&'a str>, Option<&'a str>) {
    let owner = args.owner.as_deref().or(config.owner.as_deref());
    let repo = args.repo.as_deref().or(config.repo.as_deref());
    (owner, repo)
}

fn credentials(args: &RepoArgs, config: &EventDeskConfig) -> Result<Credentials> {
    let (owner, repo) = resolve_repo(args, config);
    let env_token = std::env::var("GITHUB_TOKEN").ok();
    let token = args.token.as_deref().or(env_token.as_deref());
    Ok(Credentials::new(token, owner, repo)?)
}

impl Session {
    /// Load the list for a command that writes; needs full credentials.
    pub async fn open(args: &RepoArgs) -> Result<Self> {
        Self::open_with(args, EventDeskConfig::load()?).await
    }

    async fn open_with(args: &RepoArgs, config: EventDeskConfig) -> Result<Self> {
        let store = GitHubContents::new(&config.api_url, credentials(args, &config)?)?;

        // Without a site_url the list is read through the contents API
        let site = config.site_url.as_deref().map(SiteClient::new).transpose()?;

        let spinner = tui::create_spinner("Loading events".to_string());
        let loaded = match &site {
            Some(site) => {
                EventManager::load_or_empty(site, store, config.events_path.as_str()).await
            }
            None => EventManager::load_from_store_or_empty(store, config.events_path.as_str()).await,
        };
        spinner.finish_and_clear();
        let manager = loaded?;

        if manager.file_was_missing() {
            warn_missing(&config.events_path);
        }

        let credentials = manager.store().credentials();
        let source = describe_source(&config, credentials.owner(), credentials.repo());
        debug!(count = manager.len(), %source, "session ready");

        Ok(Session { manager, config })
    }
}

/// The list as published, for display only.
pub struct Listing {
    pub events: Vec<EventRecord>,
    pub source: String,
}

/// Read the list without writing. With a site_url nothing but the site is
/// contacted, so no token is needed.
pub async fn read_listing(args: &RepoArgs, config: &EventDeskConfig) -> Result<Listing> {
    let Some(site_url) = config.site_url.as_deref() else {
        let session = Session::open_with(args, config.clone()).await?;
        let credentials = session.manager.store().credentials();
        let source = describe_source(config, credentials.owner(), credentials.repo());
        return Ok(Listing {
            events: session.manager.events().to_vec(),
            source,
        });
    };

    let site = SiteClient::new(site_url)?;
    let spinner = tui::create_spinner("Loading events".to_string());
    let read = read_events(&site, &config.events_path).await;
    spinner.finish_and_clear();

    let events = match read? {
        Some(events) => events,
        None => {
            warn_missing(&config.events_path);
            Vec::new()
        }
    };

    let (owner, repo) = resolve_repo(args, config);
    Ok(Listing {
        events,
        source: describe_source(config, owner.unwrap_or_default(), repo.unwrap_or_default()),
    })
}

fn warn_missing(path: &str) {
    eprintln!(
        "{}",
        format!("{path} does not exist yet; it will be created with the first event.").yellow()
    );
}

/// Where the list is read from, for display.
pub fn describe_source(config: &EventDeskConfig, owner: &str, repo: &str) -> String {
    match &config.site_url {
        Some(site_url) => format!("{}/{}", site_url.trim_end_matches('/'), config.events_path),
        None => format!("{owner}/{repo}:{}", config.events_path),
    }
}
