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
    caption: String,
    alt: String,
    image: Option<PathBuf>,
) -> Result<()> {
    let image = match image {
        Some(path) => Some(
            ImageFile::read(&path)
                .await
                .with_context(|| format!("Could not read image {}", path.display()))?,
        ),
        None => None,
    };

    let fields = PendingEvent {
        alt: alt.trim().to_string(),
        caption: caption.trim().to_string(),
    };

    let uploader = ImageUploader::new(session.config.asset_dir.as_str());
    let spinner = tui::create_spinner("Saving event".to_string());
    let result = uploader
        .attach_and_finalize(&mut session.manager, image, fields, Target::New)
        .await;
    spinner.finish_and_clear();

    let record = result.map_err(|e| submit_failure(e, &session.manager))?;

    println!(
        "{} {:>3}. {}",
        "+".green(),
        session.manager.len(),
        record.render()
    );

    Ok(())
}
