use anyhow::Result;
use owo_colors::OwoColorize;

use crate::render::{pluralize, render_event_list};
use crate::session::Listing;

pub fn run(listing: &Listing) -> Result<()> {
    let count = listing.events.len();

    println!(
        "{}",
        format!("{} {} in {}", count, pluralize("event", count), listing.source).dimmed()
    );
    println!("{}", render_event_list(&listing.events));

    Ok(())
}
