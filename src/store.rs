// Task history store: the single authority over the task list and its undo/redo stacks

use crate::error::StoreError;
use crate::history::History;
use crate::models::{Task, TaskId};
use crate::storage::TaskSource;
use std::collections::VecDeque;
use std::mem;
use tracing::{debug, info, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

const DEFAULT_LOAD_ERROR: &str = "Failed to load tasks";

/// Knobs for history behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum snapshots kept per stack; `None` keeps everything
    pub history_limit: Option<usize>,
    /// Whether `import_all` discards the redo buffer like other undoable commands
    pub import_clears_redo: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            import_clears_redo: false,
        }
    }
}

/// A mutating request against the store
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(Task),
    Update(Task),
    Delete(TaskId),
    ToggleStatus(TaskId),
    Reorder { from: usize, to: usize },
    Import(Vec<Task>),
    Undo,
    Redo,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Update(_) => "update",
            Command::Delete(_) => "delete",
            Command::ToggleStatus(_) => "toggle_status",
            Command::Reorder { .. } => "reorder",
            Command::Import(_) => "import",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }

    /// Commands that record a snapshot in the undo stack
    pub fn is_undoable(&self) -> bool {
        !matches!(self, Command::Reorder { .. } | Command::Undo | Command::Redo)
    }
}

/// What happened to a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran and the revision moved
    Applied,
    /// Nothing to do (undo/redo with an empty stack)
    Unchanged,
    /// Queued until hydration settles
    Deferred,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HydrationState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

impl HydrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HydrationState::Idle => "idle",
            HydrationState::Loading => "loading",
            HydrationState::Succeeded => "succeeded",
            HydrationState::Failed(_) => "failed",
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            HydrationState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Owns the ordered task list and its snapshot history
///
/// Every command is synchronous. Callers persist `items()` whenever
/// `revision()` moves; the store never writes anything itself.
#[derive(Debug)]
pub struct TaskHistoryStore {
    items: Vec<Task>,
    history: History,
    options: StoreOptions,
    hydration: HydrationState,
    deferred: VecDeque<Command>,
    revision: u64,
}

impl Default for TaskHistoryStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl TaskHistoryStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            items: Vec::new(),
            history: History::new(options.history_limit),
            options,
            hydration: HydrationState::Idle,
            deferred: VecDeque::new(),
            revision: 0,
        }
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn items(&self) -> &[Task] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn past(&self) -> &[Vec<Task>] {
        self.history.past()
    }

    pub fn future(&self) -> &[Vec<Task>] {
        self.history.future()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn hydration(&self) -> &HydrationState {
        &self.hydration
    }

    /// Monotonic counter bumped by every applied command
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_commands(&self) -> usize {
        self.deferred.len()
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Dispatch a command to the matching operation
    pub fn apply(&mut self, command: Command) -> Result<Outcome, StoreError> {
        match command {
            Command::Add(task) => Ok(self.add(task)),
            Command::Update(task) => Ok(self.update(task)),
            Command::Delete(id) => Ok(self.delete(&id)),
            Command::ToggleStatus(id) => Ok(self.toggle_status(&id)),
            Command::Reorder { from, to } => self.reorder(from, to),
            Command::Import(records) => Ok(self.import_all(records)),
            Command::Undo => Ok(self.undo()),
            Command::Redo => Ok(self.redo()),
        }
    }

    /// Prepend a task
    pub fn add(&mut self, task: Task) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Add(task));
        }

        self.checkpoint();
        self.items.insert(0, task);
        self.bump("add")
    }

    /// Replace the first task with the same id, keeping its position
    pub fn update(&mut self, task: Task) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Update(task));
        }

        self.checkpoint();
        match self.items.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => debug!(id = %task.id, "update: no task with this id"),
        }
        self.bump("update")
    }

    /// Remove every task with this id
    pub fn delete(&mut self, id: &str) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Delete(id.to_string()));
        }

        self.checkpoint();
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        if self.items.len() == before {
            debug!(id, "delete: no task with this id");
        }
        self.bump("delete")
    }

    /// Flip COMPLETED back to TODO, complete anything else
    pub fn toggle_status(&mut self, id: &str) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::ToggleStatus(id.to_string()));
        }

        self.checkpoint();
        match self.items.iter_mut().find(|t| t.id == id) {
            Some(task) => task.status = task.status.toggled(),
            None => debug!(id, "toggle_status: no task with this id"),
        }
        self.bump("toggle_status")
    }

    /// Move the task at `from` so it ends up at `to`
    ///
    /// Not recorded in history and leaves the redo buffer alone. Both indices
    /// must be inside the current list.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<Outcome, StoreError> {
        if self.is_loading() {
            return Ok(self.defer(Command::Reorder { from, to }));
        }

        let len = self.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(StoreError::IndexOutOfRange { index, len });
            }
        }

        let task = self.items.remove(from);
        self.items.insert(to, task);
        Ok(self.bump("reorder"))
    }

    /// Replace the whole list
    pub fn import_all(&mut self, records: Vec<Task>) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Import(records));
        }

        let previous = mem::replace(&mut self.items, records);
        self.history.push_past(previous);
        if self.options.import_clears_redo {
            self.history.clear_future();
        }
        self.bump("import")
    }

    pub fn undo(&mut self) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Undo);
        }

        let Some(previous) = self.history.pop_past() else {
            return Outcome::Unchanged;
        };
        let current = mem::replace(&mut self.items, previous);
        self.history.push_future(current);
        self.bump("undo")
    }

    pub fn redo(&mut self) -> Outcome {
        if self.is_loading() {
            return self.defer(Command::Redo);
        }

        let Some(next) = self.history.pop_future() else {
            return Outcome::Unchanged;
        };
        let current = mem::replace(&mut self.items, next);
        self.history.push_past(current);
        self.bump("redo")
    }

    // ========================================================================
    // Hydration
    // ========================================================================

    /// Enter the loading state with an empty list
    pub fn begin_hydration(&mut self) {
        info!("Hydrating task list");
        self.hydration = HydrationState::Loading;
        self.items.clear();
        self.history.clear();
    }

    /// Settle hydration and replay commands queued while loading
    ///
    /// Returns the number of queued commands that were applied.
    pub fn finish_hydration(&mut self, result: eyre::Result<Vec<Task>>) -> usize {
        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "Hydration succeeded");
                self.items = tasks;
                self.hydration = HydrationState::Succeeded;
            }
            Err(e) => {
                let message = format!("{:#}", e);
                let reason = if message.trim().is_empty() {
                    DEFAULT_LOAD_ERROR.to_string()
                } else {
                    message
                };
                warn!(error = %reason, "Hydration failed, continuing with an empty list");
                self.items.clear();
                self.hydration = HydrationState::Failed(reason);
            }
        }
        self.history.clear();
        self.replay_deferred()
    }

    /// Load from `source` and settle hydration in one step
    pub fn hydrate<S: TaskSource + ?Sized>(&mut self, source: &S) -> usize {
        self.begin_hydration();
        let result = source.load();
        self.finish_hydration(result)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn is_loading(&self) -> bool {
        self.hydration == HydrationState::Loading
    }

    fn defer(&mut self, command: Command) -> Outcome {
        debug!(command = command.name(), "Deferring command until hydration settles");
        self.deferred.push_back(command);
        Outcome::Deferred
    }

    fn replay_deferred(&mut self) -> usize {
        let mut applied = 0;
        while let Some(command) = self.deferred.pop_front() {
            let name = command.name();
            match self.apply(command) {
                Ok(Outcome::Applied) => applied += 1,
                Ok(_) => {}
                Err(e) => warn!(command = name, error = %e, "Dropping deferred command"),
            }
        }
        applied
    }

    /// Snapshot the current list before an undoable change
    fn checkpoint(&mut self) {
        self.history.push_past(self.items.clone());
        self.history.clear_future();
    }

    fn bump(&mut self, command: &'static str) -> Outcome {
        self.revision += 1;
        debug!(
            command,
            revision = self.revision,
            len = self.items.len(),
            past = self.history.past().len(),
            future = self.history.future().len(),
            "Applied command"
        );
        Outcome::Applied
    }
}
