// Dashboard statistics projected from the task list

use crate::models::{Task, TaskPriority, TaskStatus};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub todo: usize,
    /// Every priority is present, zero when unused
    pub by_priority: BTreeMap<TaskPriority, usize>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut by_priority: BTreeMap<TaskPriority, usize> = TaskPriority::ALL.into_iter().map(|p| (p, 0)).collect();
        let (mut completed, mut in_progress, mut todo) = (0, 0, 0);

        for task in tasks {
            match task.status {
                TaskStatus::Completed => completed += 1,
                TaskStatus::InProgress => in_progress += 1,
                TaskStatus::Todo => todo += 1,
            }
            *by_priority.entry(task.priority).or_insert(0) += 1;
        }

        Self {
            total: tasks.len(),
            completed,
            in_progress,
            todo,
            by_priority,
        }
    }

    /// Completed share of all tasks, 0.0 for an empty list
    pub fn completion_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}
