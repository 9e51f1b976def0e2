use std::path::PathBuf;

use anyhow::{Context, Result};
use eventdesk_core::upload::{ImageFile, ImageUploader, PendingEvent, Target};
use owo_colors::OwoColorize;

use crate::commands::submit_failure;
use crate::render::Render;
use crate::session::Session;
use crate::utils::tui;

pub async fn run(
    session: &mut Session,
    index: usize,
    caption: Option<String>,
    alt: Option<String>,
    image: Option<PathBuf>,
) -> Result<()> {
    session.manager.check_index(index)?;
    let current = session.manager.events()[index].clone();

    if caption.is_none() && alt.is_none() && image.is_none() {
        println!("{}", "Nothing to change".dimmed());
        return Ok(());
    }

    let image = match image {
        Some(path) => Some(
            ImageFile::read(&path)
                .await
                .with_context(|| format!("Could not read image {}", path.display()))?,
        ),
        None => None,
    };

    let fields = PendingEvent {
        alt: alt.map_or(current.alt, |a| a.trim().to_string()),
        caption: caption.map_or(current.caption, |c| c.trim().to_string()),
    };

    let uploader = ImageUploader::new(session.config.asset_dir.as_str());
    let spinner = tui::create_spinner(format!("Updating event {}", index + 1));
    let result = uploader
        .attach_and_finalize(&mut session.manager, image, fields, Target::Existing(index))
        .await;
    spinner.finish_and_clear();

    let record = result.map_err(|e| submit_failure(e, &session.manager))?;

    println!("{} {:>3}. {}", "~".yellow(), index + 1, record.render());

    Ok(())
}
