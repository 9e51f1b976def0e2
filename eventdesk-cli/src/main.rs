mod commands;
mod render;
mod session;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use eventdesk_core::config::EventDeskConfig;
use tracing_subscriber::EnvFilter;

use crate::session::Session;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Manage the events shown on your site, stored in a GitHub repository")]
struct Cli {
    #[command(flatten)]
    repo: RepoArgs,

    /// Log requests and sync steps to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the site lives and how to authenticate. Read per invocation.
#[derive(Args)]
pub struct RepoArgs {
    /// GitHub user or organization owning the site repository
    #[arg(long, global = true, env = "EVENTDESK_OWNER")]
    pub owner: Option<String>,

    /// Name of the site repository
    #[arg(long, global = true, env = "EVENTDESK_REPO")]
    pub repo: Option<String>,

    /// GitHub token with write access to the repository (falls back to GITHUB_TOKEN)
    #[arg(long, global = true, env = "EVENTDESK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current event list
    List,
    /// Add an event at the end of the list
    Add {
        /// Caption shown under the image
        #[arg(short, long)]
        caption: String,

        /// Alternative text describing the image
        #[arg(short, long)]
        alt: String,

        /// Image file to upload with the event
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Change an event (fields you leave out keep their current value)
    Edit {
        /// Event number as shown by `eventdesk list`
        number: usize,

        #[arg(short, long)]
        caption: Option<String>,

        #[arg(short, long)]
        alt: Option<String>,

        /// Replace the event's image with this file
        #[arg(short, long)]
        image: Option<PathBuf>,
    },
    /// Delete an event
    Remove {
        /// Event number as shown by `eventdesk list`
        number: usize,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show config paths and resolved settings
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::List => {
            let config = EventDeskConfig::load()?;
            let listing = session::read_listing(&cli.repo, &config).await?;
            commands::list::run(&listing)
        }
        Commands::Add {
            caption,
            alt,
            image,
        } => {
            let mut session = Session::open(&cli.repo).await?;
            commands::add::run(&mut session, caption, alt, image).await
        }
        Commands::Edit {
            number,
            caption,
            alt,
            image,
        } => {
            let index = commands::index_from_number(number)?;
            let mut session = Session::open(&cli.repo).await?;
            commands::edit::run(&mut session, index, caption, alt, image).await
        }
        Commands::Remove { number, force } => {
            let index = commands::index_from_number(number)?;
            let mut session = Session::open(&cli.repo).await?;
            commands::remove::run(&mut session, index, force).await
        }
        Commands::Config => commands::config::run(&cli.repo),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "eventdesk=debug,eventdesk_core=debug,warn"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}
