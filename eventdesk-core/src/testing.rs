//! In-memory content store for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{EventDeskError, EventDeskResult};
use crate::remote::{ContentStore, EventSource, Revision};

#[derive(Debug, Clone)]
pub struct WriteCall {
    pub path: String,
    pub bytes: Vec<u8>,
    pub message: String,
    pub revision: Option<Revision>,
}

#[derive(Default)]
struct State {
    files: HashMap<String, (Vec<u8>, Revision)>,
    writes: Vec<WriteCall>,
    next_revision: u64,
    fail_writes_under: Option<String>,
}

/// Behaves like the contents API: writes to an existing file need its
/// current revision, creates must not carry one.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: &str, bytes: &[u8]) -> Self {
        let store = Self::new();
        store.put(path, bytes);
        store
    }

    /// Replace a file out of band, as another editor would.
    pub fn put(&self, path: &str, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.next_revision += 1;
        let revision = Revision::new(format!("rev-{}", state.next_revision));
        state.files.insert(path.to_string(), (bytes.to_vec(), revision));
    }

    /// Make every write whose path starts with `prefix` fail with a 500.
    pub fn fail_writes_under(&self, prefix: &str) {
        self.state.lock().unwrap().fail_writes_under = Some(prefix.to_string());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(path).map(|(b, _)| b.clone())
    }

    pub fn file_string(&self, path: &str) -> Option<String> {
        self.file(path).map(|b| String::from_utf8(b).unwrap())
    }

    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().unwrap().writes.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch_revision(&self, path: &str) -> EventDeskResult<Option<Revision>> {
        let state = self.state.lock().unwrap();
        Ok(state.files.get(path).map(|(_, r)| r.clone()))
    }

    async fn write_object(
        &self,
        path: &str,
        bytes: &[u8],
        message: &str,
        revision: Option<&Revision>,
    ) -> EventDeskResult<()> {
        let mut state = self.state.lock().unwrap();
        state.writes.push(WriteCall {
            path: path.to_string(),
            bytes: bytes.to_vec(),
            message: message.to_string(),
            revision: revision.cloned(),
        });

        if let Some(prefix) = &state.fail_writes_under {
            if path.starts_with(prefix.as_str()) {
                return Err(EventDeskError::Write {
                    status: 500,
                    body: "simulated failure".to_string(),
                });
            }
        }

        let current = state.files.get(path).map(|(_, r)| r.clone());
        match (current, revision) {
            (Some(current), Some(given)) if &current != given => {
                return Err(EventDeskError::Write {
                    status: 409,
                    body: format!("{path} does not match {given}"),
                });
            }
            (Some(_), None) => {
                return Err(EventDeskError::Write {
                    status: 422,
                    body: "\"sha\" wasn't supplied.".to_string(),
                });
            }
            _ => {}
        }

        state.next_revision += 1;
        let revision = Revision::new(format!("rev-{}", state.next_revision));
        state.files.insert(path.to_string(), (bytes.to_vec(), revision));
        Ok(())
    }
}

#[async_trait]
impl EventSource for MemoryStore {
    async fn fetch(&self, path: &str) -> EventDeskResult<Vec<u8>> {
        self.file(path)
            .ok_or_else(|| EventDeskError::NotFound {
                path: path.to_string(),
            })
    }
}
