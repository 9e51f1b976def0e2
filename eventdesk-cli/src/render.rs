//! TUI rendering traits for eventdesk types.

use eventdesk_core::EventRecord;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventRecord {
    fn render(&self) -> String {
        let caption = if self.caption.is_empty() {
            "(no caption)".dimmed().to_string()
        } else {
            self.caption.bold().to_string()
        };

        let image = if self.has_image() {
            self.image.cyan().to_string()
        } else {
            "no image".dimmed().to_string()
        };

        format!("{}\n      alt: {}\n      {}", caption, self.alt.dimmed(), image)
    }
}

/// Numbered list as shown by `eventdesk list`; numbers start at 1.
pub fn render_event_list(events: &[EventRecord]) -> String {
    if events.is_empty() {
        return "No events yet".dimmed().to_string();
    }

    events
        .iter()
        .enumerate()
        .map(|(i, event)| format!("{:>3}. {}", i + 1, event.render()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
