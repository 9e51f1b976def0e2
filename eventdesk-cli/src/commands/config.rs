use anyhow::Result;
use eventdesk_core::config::EventDeskConfig;
use owo_colors::OwoColorize;

use crate::RepoArgs;
use crate::session::{describe_source, resolve_repo};

pub fn run(args: &RepoArgs) -> Result<()> {
    let config_path = EventDeskConfig::config_path()?;
    let config = EventDeskConfig::load()?;
    let (owner, repo) = resolve_repo(args, &config);
    let unset = "(not set)".dimmed().to_string();

    println!("{}", "Paths".bold());
    println!("  Config:      {}", config_path.display());
    println!();
    println!("{}", "Repository".bold());
    println!("  Owner:       {}", owner.map_or(unset.clone(), str::to_string));
    println!("  Repo:        {}", repo.map_or(unset.clone(), str::to_string));
    println!(
        "  Token:       {}",
        if args.token.is_some() || std::env::var("GITHUB_TOKEN").is_ok() {
            "provided".to_string()
        } else {
            unset
        }
    );
    println!("  API:         {}", config.api_url);
    println!();
    println!("{}", "Content".bold());
    println!("  Events file: {}", config.events_path);
    println!("  Images:      {}/", config.asset_dir.trim_end_matches('/'));
    println!(
        "  Read from:   {}",
        describe_source(&config, owner.unwrap_or("?"), repo.unwrap_or("?"))
    );

    Ok(())
}
