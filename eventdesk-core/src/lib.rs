//! Core library for eventdesk.
//!
//! This crate manages a site's event list stored as `events.json` in a
//! GitHub repository:
//! - `event` for the record type and its canonical encoding
//! - `remote` for the contents API client and the published-site reader
//! - `collection` for the in-memory list and its read-modify-write sync
//! - `upload` for committing an image before the record that uses it

pub mod collection;
pub mod config;
pub mod credentials;
pub mod error;
pub mod event;
pub mod remote;
pub mod upload;

#[cfg(test)]
mod testing;

pub use collection::{EventManager, SyncState, read_events};
pub use error::{EventDeskError, EventDeskResult};
pub use event::EventRecord;
