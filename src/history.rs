// Undo/redo snapshot stacks

use crate::models::Task;

/// Two stacks of full list snapshots
///
/// The top of each stack is the last element. `limit` caps both stacks; when a
/// push would exceed it, the oldest snapshot is dropped.
#[derive(Debug, Clone, Default)]
pub struct History {
    past: Vec<Vec<Task>>,
    future: Vec<Vec<Task>>,
    limit: Option<usize>,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn past(&self) -> &[Vec<Task>] {
        &self.past
    }

    pub fn future(&self) -> &[Vec<Task>] {
        &self.future
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn push_past(&mut self, snapshot: Vec<Task>) {
        Self::push_bounded(&mut self.past, snapshot, self.limit);
    }

    pub fn push_future(&mut self, snapshot: Vec<Task>) {
        Self::push_bounded(&mut self.future, snapshot, self.limit);
    }

    pub fn pop_past(&mut self) -> Option<Vec<Task>> {
        self.past.pop()
    }

    pub fn pop_future(&mut self) -> Option<Vec<Task>> {
        self.future.pop()
    }

    pub fn clear_future(&mut self) {
        self.future.clear();
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    fn push_bounded(stack: &mut Vec<Vec<Task>>, snapshot: Vec<Task>, limit: Option<usize>) {
        stack.push(snapshot);
        if let Some(limit) = limit {
            let overflow = stack.len().saturating_sub(limit);
            if overflow > 0 {
                stack.drain(..overflow);
            }
        }
    }
}
