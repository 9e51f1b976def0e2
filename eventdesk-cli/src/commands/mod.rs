pub mod add;
pub mod config;
pub mod edit;
pub mod list;
pub mod remove;

use anyhow::Result;
use eventdesk_core::EventManager;
use eventdesk_core::remote::ContentStore;
use eventdesk_core::upload::SubmitError;
use owo_colors::OwoColorize;

/// Convert a 1-based event number from the command line to a list index.
pub fn index_from_number(number: usize) -> Result<usize> {
    number
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("Event numbers start at 1 (see `eventdesk list`)"))
}

/// Tell the operator when the list in memory no longer matches the repository.
pub fn warn_if_unsaved<S: ContentStore>(manager: &EventManager<S>) {
    if !manager.is_synced() {
        eprintln!(
            "{}",
            "The event list was changed here but could not be saved; the site still shows the previous list."
                .yellow()
        );
    }
}

/// Report a failed submit, including an uploaded image left without an event.
pub fn submit_failure<S: ContentStore>(err: SubmitError, manager: &EventManager<S>) -> anyhow::Error {
    if let Some(path) = &err.orphaned_asset {
        eprintln!(
            "{} {}",
            "The image was uploaded but no event refers to it:".yellow(),
            path
        );
    }
    warn_if_unsaved(manager);
    anyhow::Error::new(err)
}
