use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use crate::commands::warn_if_unsaved;
use crate::render::Render;
use crate::session::Session;
use crate::utils::tui;

pub async fn run(session: &mut Session, index: usize, force: bool) -> Result<()> {
    session.manager.check_index(index)?;

    if !force {
        let event = &session.manager.events()[index];
        println!("{:>3}. {}", index + 1, event.render());
        println!();

        let confirmed = Confirm::new()
            .with_prompt("Delete this event?")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let spinner = tui::create_spinner(format!("Removing event {}", index + 1));
    let result = session.manager.remove(index).await;
    spinner.finish_and_clear();

    match result {
        Ok(removed) => {
            println!("{} {}", "-".red(), removed.caption.red());
            Ok(())
        }
        Err(e) => {
            warn_if_unsaved(&session.manager);
            Err(e.into())
        }
    }
}
