//! The in-memory event list and its synchronization with the content store.
//!
//! Every mutation is applied to memory first and then written out as a full
//! overwrite of the events file. A failed write does not undo the local
//! change; instead the manager reports [`SyncState::Unsaved`] until the next
//! successful write, so callers can tell the operator that what they see is
//! not what the site has.

use tracing::{debug, warn};

use crate::error::{EventDeskError, EventDeskResult};
use crate::event::{self, EventRecord};
use crate::remote::{ContentStore, EventSource};

pub const ADD_MESSAGE: &str = "Add event";
pub const UPDATE_MESSAGE: &str = "Update event";
pub const REMOVE_MESSAGE: &str = "Remove event";

/// Whether the in-memory list matches what was last written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Synced,
    /// Changed locally; the last write failed or has not happened.
    Unsaved,
}

/// Owns the event list for one session and persists it through `S`.
pub struct EventManager<S: ContentStore> {
    store: S,
    path: String,
    events: Vec<EventRecord>,
    state: SyncState,
    file_missing: bool,
}

impl<S: ContentStore> EventManager<S> {
    pub fn new(store: S, path: impl Into<String>, events: Vec<EventRecord>) -> Self {
        EventManager {
            store,
            path: path.into(),
            events,
            state: SyncState::Synced,
            file_missing: false,
        }
    }

    /// Read the published list from `source` and take ownership of it.
    pub async fn load<E: EventSource + ?Sized>(
        source: &E,
        store: S,
        path: impl Into<String>,
    ) -> EventDeskResult<Self> {
        let path = path.into();
        let bytes = source.fetch(&path).await?;
        let events = event::from_json(&bytes)?;
        debug!(path = %path, count = events.len(), "loaded events");

        Ok(Self::new(store, path, events))
    }

    /// Like [`EventManager::load`], reading through the store itself.
    pub async fn load_from_store(store: S, path: impl Into<String>) -> EventDeskResult<Self>
    where
        S: EventSource,
    {
        let path = path.into();
        let bytes = store.fetch(&path).await?;
        let events = event::from_json(&bytes)?;
        debug!(path = %path, count = events.len(), "loaded events from store");

        Ok(Self::new(store, path, events))
    }

    /// Like [`EventManager::load`], but a file that does not exist yet
    /// starts an empty list; the first write creates it. Invalid content and
    /// every other failure still fail.
    pub async fn load_or_empty<E: EventSource + ?Sized>(
        source: &E,
        store: S,
        path: impl Into<String>,
    ) -> EventDeskResult<Self> {
        let path = path.into();
        let events = read_events(source, &path).await?;
        Ok(Self::from_read(store, path, events))
    }

    /// Like [`EventManager::load_or_empty`], reading through the store itself.
    pub async fn load_from_store_or_empty(store: S, path: impl Into<String>) -> EventDeskResult<Self>
    where
        S: EventSource,
    {
        let path = path.into();
        let events = read_events(&store, &path).await?;
        Ok(Self::from_read(store, path, events))
    }

    fn from_read(store: S, path: String, events: Option<Vec<EventRecord>>) -> Self {
        match events {
            Some(events) => Self::new(store, path, events),
            None => {
                let mut manager = Self::new(store, path, Vec::new());
                manager.file_missing = true;
                manager
            }
        }
    }

    /// True while the file has not been created yet.
    pub fn file_was_missing(&self) -> bool {
        self.file_missing
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&EventRecord> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn sync_state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    pub fn to_json(&self) -> EventDeskResult<String> {
        event::to_canonical_json(&self.events)
    }

    pub fn check_index(&self, index: usize) -> EventDeskResult<()> {
        if index < self.events.len() {
            Ok(())
        } else {
            Err(EventDeskError::IndexOutOfRange {
                index,
                len: self.events.len(),
            })
        }
    }

    pub async fn add(&mut self, record: EventRecord) -> EventDeskResult<()> {
        self.events.push(record);
        self.state = SyncState::Unsaved;
        self.persist(ADD_MESSAGE).await
    }

    pub async fn update(&mut self, index: usize, record: EventRecord) -> EventDeskResult<()> {
        self.check_index(index)?;
        self.events[index] = record;
        self.state = SyncState::Unsaved;
        self.persist(UPDATE_MESSAGE).await
    }

    /// Remove the event at `index`; later events move up by one.
    pub async fn remove(&mut self, index: usize) -> EventDeskResult<EventRecord> {
        self.check_index(index)?;
        let removed = self.events.remove(index);
        self.state = SyncState::Unsaved;
        self.persist(REMOVE_MESSAGE).await?;
        Ok(removed)
    }

    /// Overwrite the remote file with the full list.
    ///
    /// The revision is fetched right before the write on every call, never
    /// reused from an earlier one.
    pub async fn persist(&mut self, message: &str) -> EventDeskResult<()> {
        let json = self.to_json()?;

        let result = async {
            let revision = self.store.fetch_revision(&self.path).await?;
            self.store
                .write_object(&self.path, json.as_bytes(), message, revision.as_ref())
                .await
        }
        .await;

        match result {
            Ok(()) => {
                self.state = SyncState::Synced;
                self.file_missing = false;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path, audit = message, "local event list not saved: {e}");
                Err(e)
            }
        }
    }
}

/// Read and parse the list at `path`. `Ok(None)` when the file does not
/// exist yet; unreadable or invalid content is still an error.
pub async fn read_events<E: EventSource + ?Sized>(
    source: &E,
    path: &str,
) -> EventDeskResult<Option<Vec<EventRecord>>> {
    match source.fetch(path).await {
        Ok(bytes) => {
            let events = event::from_json(&bytes)?;
            debug!(path, count = events.len(), "read events");
            Ok(Some(events))
        }
        Err(EventDeskError::NotFound { .. }) => {
            warn!(path, "events file does not exist yet");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use pretty_assertions::assert_eq;

    const PATH: &str = "events.json";

    fn record(name: &str) -> EventRecord {
        EventRecord::new(format!("{name}.png"), name.to_uppercase(), format!("Caption {name}"))
    }

    fn manager_with(events: Vec<EventRecord>) -> EventManager<MemoryStore> {
        let json = event::to_canonical_json(&events).unwrap();
        EventManager::new(MemoryStore::with_file(PATH, json.as_bytes()), PATH, events)
    }

    fn remote(manager: &EventManager<MemoryStore>) -> String {
        manager.store().file_string(PATH).unwrap()
    }

    #[tokio::test]
    async fn test_add_to_empty_list_creates_file() {
        let mut manager = EventManager::new(MemoryStore::new(), PATH, vec![]);

        manager
            .add(EventRecord::new("a.png", "A", "First"))
            .await
            .unwrap();

        let expected: Vec<EventRecord> =
            serde_json::from_str(r#"[{"image":"a.png","alt":"A","caption":"First"}]"#).unwrap();
        assert_eq!(remote(&manager), event::to_canonical_json(&expected).unwrap());

        let writes = manager.store().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].message, "Add event");
        assert_eq!(writes[0].revision, None);
        assert!(manager.is_synced());
    }

    #[tokio::test]
    async fn test_remove_first_of_two() {
        let (x, y) = (record("x"), record("y"));
        let mut manager = manager_with(vec![x.clone(), y.clone()]);

        let removed = manager.remove(0).await.unwrap();

        assert_eq!(removed, x);
        assert_eq!(manager.events(), &[y.clone()]);
        assert_eq!(remote(&manager), event::to_canonical_json(&[y]).unwrap());
        assert_eq!(manager.store().writes()[0].message, "Remove event");
    }

    #[tokio::test]
    async fn test_remove_shifts_later_indices() {
        let events: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| record(n)).collect();
        let mut manager = manager_with(events.clone());

        manager.remove(1).await.unwrap();

        assert_eq!(manager.len(), 3);
        assert_eq!(manager.get(0), Some(&events[0]));
        assert_eq!(manager.get(1), Some(&events[2]));
        assert_eq!(manager.get(2), Some(&events[3]));
    }

    #[tokio::test]
    async fn test_update_only_touches_target() {
        let events: Vec<_> = ["a", "b", "c"].iter().map(|n| record(n)).collect();
        let mut manager = manager_with(events.clone());
        let replacement = EventRecord::new("new.png", "N", "New");

        manager.update(1, replacement.clone()).await.unwrap();

        assert_eq!(manager.len(), 3);
        assert_eq!(manager.get(0), Some(&events[0]));
        assert_eq!(manager.get(1), Some(&replacement));
        assert_eq!(manager.get(2), Some(&events[2]));
        assert_eq!(manager.store().writes()[0].message, "Update event");
    }

    #[tokio::test]
    async fn test_out_of_range_index_changes_nothing() {
        let mut manager = manager_with(vec![record("a")]);

        let err = manager.update(1, record("z")).await.unwrap_err();
        assert!(matches!(err, EventDeskError::IndexOutOfRange { index: 1, len: 1 }));

        let err = manager.remove(5).await.unwrap_err();
        assert!(matches!(err, EventDeskError::IndexOutOfRange { index: 5, len: 1 }));

        assert_eq!(manager.events(), &[record("a")]);
        assert!(manager.store().writes().is_empty());
        assert!(manager.is_synced());
    }

    #[tokio::test]
    async fn test_remote_matches_memory_after_many_operations() {
        let mut manager = EventManager::new(MemoryStore::new(), PATH, vec![]);

        manager.add(record("a")).await.unwrap();
        manager.add(record("b")).await.unwrap();
        manager.add(record("c")).await.unwrap();
        manager.update(0, record("z")).await.unwrap();
        manager.remove(1).await.unwrap();
        manager.add(record("d")).await.unwrap();

        assert_eq!(
            manager.events(),
            &[record("z"), record("c"), record("d")]
        );
        assert_eq!(remote(&manager), manager.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_revision_is_fetched_fresh_for_each_write() {
        let mut manager = manager_with(vec![record("a")]);

        manager.add(record("b")).await.unwrap();
        // Someone else edits the file between our two writes
        manager.store().put(PATH, b"[]");
        manager.add(record("c")).await.unwrap();

        let writes = manager.store().writes();
        assert_eq!(writes.len(), 2);
        assert_ne!(writes[0].revision, writes[1].revision);
        assert_eq!(remote(&manager), manager.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_load_then_persist_is_byte_identical() {
        let events = vec![record("a"), EventRecord::new("", "Ümlaut", "Fête")];
        let original = event::to_canonical_json(&events).unwrap();
        let store = MemoryStore::with_file(PATH, original.as_bytes());
        let source = MemoryStore::with_file(PATH, original.as_bytes());

        let mut manager = EventManager::load(&source, store, PATH).await.unwrap();
        manager.persist("Resave").await.unwrap();

        assert_eq!(remote(&manager), original);
    }

    #[tokio::test]
    async fn test_load_from_store_reads_and_writes_same_file() {
        let original = event::to_canonical_json(&[record("a")]).unwrap();
        let store = MemoryStore::with_file(PATH, original.as_bytes());

        let mut manager = EventManager::load_from_store(store, PATH).await.unwrap();
        assert_eq!(manager.events(), &[record("a")]);

        manager.add(record("b")).await.unwrap();
        assert_eq!(remote(&manager), manager.to_json().unwrap());
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let source = MemoryStore::new();
        let result = EventManager::load(&source, MemoryStore::new(), PATH).await;
        assert!(matches!(result, Err(EventDeskError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty_and_first_add_creates_it() {
        let mut manager = EventManager::load_from_store_or_empty(MemoryStore::new(), PATH)
            .await
            .unwrap();

        assert!(manager.is_empty());
        assert!(manager.file_was_missing());

        manager.add(record("a")).await.unwrap();

        let writes = manager.store().writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].path, PATH);
        assert_eq!(writes[0].revision, None);
        assert_eq!(remote(&manager), event::to_canonical_json(&[record("a")]).unwrap());
        assert!(!manager.file_was_missing());
    }

    #[tokio::test]
    async fn test_load_or_empty_reads_existing_file() {
        let original = event::to_canonical_json(&[record("a")]).unwrap();
        let source = MemoryStore::with_file(PATH, original.as_bytes());

        let manager = EventManager::load_or_empty(&source, MemoryStore::new(), PATH)
            .await
            .unwrap();

        assert_eq!(manager.events(), &[record("a")]);
        assert!(!manager.file_was_missing());
    }

    #[tokio::test]
    async fn test_read_events_missing_file_is_none() {
        let source = MemoryStore::new();
        assert_eq!(read_events(&source, PATH).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_or_empty_still_rejects_invalid_json() {
        let source = MemoryStore::with_file(PATH, b"<html>not json</html>");
        let result = EventManager::load_or_empty(&source, MemoryStore::new(), PATH).await;
        assert!(matches!(result, Err(EventDeskError::Load(_))));
    }

    #[tokio::test]
    async fn test_load_invalid_json_fails() {
        let source = MemoryStore::with_file(PATH, b"<html>not json</html>");
        let result = EventManager::load(&source, MemoryStore::new(), PATH).await;
        assert!(matches!(result, Err(EventDeskError::Load(_))));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_local_change_and_reports_unsaved() {
        let mut manager = manager_with(vec![record("a")]);
        let before = remote(&manager);
        manager.store().fail_writes_under(PATH);

        let err = manager.add(record("b")).await.unwrap_err();

        assert!(matches!(err, EventDeskError::Write { status: 500, .. }));
        assert_eq!(manager.events(), &[record("a"), record("b")]);
        assert_eq!(manager.sync_state(), SyncState::Unsaved);
        assert_eq!(remote(&manager), before);
    }

    #[tokio::test]
    async fn test_failed_remove_and_update_also_report_unsaved() {
        let mut manager = manager_with(vec![record("a"), record("b")]);
        manager.store().fail_writes_under(PATH);

        assert!(manager.update(0, record("z")).await.is_err());
        assert!(manager.remove(1).await.is_err());

        assert_eq!(manager.events(), &[record("z")]);
        assert!(!manager.is_synced());
    }
}
