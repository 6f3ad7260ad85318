// List view filtering over tasks

use crate::models::{Task, TaskPriority, TaskStatus};

/// Filter for the task list view
///
/// Every criterion that is set must match. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = if query.trim().is_empty() { None } else { Some(query) };
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.status.is_none() && self.priority.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        match &self.search {
            Some(query) => {
                let query = query.trim().to_lowercase();
                task.title.to_lowercase().contains(&query) || task.description.to_lowercase().contains(&query)
            }
            None => true,
        }
    }

    /// Matching tasks, in list order
    pub fn apply<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t)).collect()
    }
}
