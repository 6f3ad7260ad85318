// Session: a store plus its persistence collaborator
//
// The store only produces values; the session is the caller that writes them.
// After every command that moves the store's revision, the new list is handed
// to the sink. Save failures are logged and never reach the caller.
//
// A session whose load failed is read-only: edits still apply in memory but
// nothing is written, so the unreadable file stays intact. An import lifts it.

use crate::error::StoreError;
use crate::models::Task;
use crate::storage::{TaskSink, TaskSource};
use crate::store::{Command, Outcome, StoreOptions, TaskHistoryStore};
use tracing::{debug, warn};

pub struct Session<S> {
    store: TaskHistoryStore,
    storage: S,
    saved_revision: u64,
    read_only: bool,
}

impl<S: TaskSource + TaskSink> Session<S> {
    /// Build a store and hydrate it from `storage`
    pub fn open(storage: S, options: StoreOptions) -> Self {
        let mut session = Self {
            store: TaskHistoryStore::new(options),
            storage,
            saved_revision: 0,
            read_only: false,
        };
        session.store.hydrate(&session.storage);
        session.read_only = session.store.hydration().error().is_some();
        session.persist_if_changed();
        session
    }

    pub fn store(&self) -> &TaskHistoryStore {
        &self.store
    }

    pub fn items(&self) -> &[Task] {
        self.store.items()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// True while the stored list failed to load and no import has replaced it
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, StoreError> {
        let replaces_all = matches!(command, Command::Import(_));
        let outcome = self.store.apply(command)?;
        if replaces_all && outcome == Outcome::Applied && self.read_only {
            debug!("Import replaced unreadable task list, saving enabled");
            self.read_only = false;
        }
        self.persist_if_changed();
        Ok(outcome)
    }

    fn persist_if_changed(&mut self) {
        let revision = self.store.revision();
        if revision == self.saved_revision {
            return;
        }
        self.saved_revision = revision;

        if self.read_only {
            warn!(revision, "Task list failed to load, not overwriting it");
            return;
        }

        debug!(revision, count = self.store.len(), "Persisting task list");
        if let Err(e) = self.storage.save(self.store.items()) {
            let reason = format!("{:#}", e);
            warn!(error = %reason, "Failed to persist task list");
        }
    }
}
