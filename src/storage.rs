// Persistence collaborator for the task list

use crate::jsonl;
use crate::models::Task;
use eyre::Result;
use std::path::{Path, PathBuf};

const TASKS_FILE: &str = "tasks.jsonl";

/// Where the task list comes from at startup
pub trait TaskSource {
    fn load(&self) -> Result<Vec<Task>>;
}

/// Where the task list goes after every change
pub trait TaskSink {
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// Task list stored as `tasks.jsonl` inside a data directory
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(TASKS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskSource for TaskFile {
    fn load(&self) -> Result<Vec<Task>> {
        jsonl::read_jsonl(&self.path)
    }
}

impl TaskSink for TaskFile {
    fn save(&self, tasks: &[Task]) -> Result<()> {
        jsonl::write_jsonl(&self.path, tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_task_file_in_dir() {
        let temp = TempDir::new().unwrap();
        let file = TaskFile::in_dir(temp.path());
        assert_eq!(file.path(), temp.path().join("tasks.jsonl"));
    }

    #[test]
    fn test_task_file_save_and_load() {
        let temp = TempDir::new().unwrap();
        let file = TaskFile::in_dir(temp.path());

        assert!(file.load().unwrap().is_empty());

        file.save(&[Task::new("t-1", "Buy milk"), Task::new("t-2", "Pay rent")])
            .unwrap();
        let loaded = file.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "Buy milk");
    }
}
