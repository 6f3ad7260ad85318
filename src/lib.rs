// TaskMaster - personal task tracking with an undo/redo history store

pub mod config;
pub mod error;
pub mod filter;
pub mod history;
pub mod jsonl;
pub mod models;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod transfer;

// Re-export main types for convenience
pub use config::Config;
pub use error::StoreError;
pub use filter::TaskFilter;
pub use models::{Task, TaskId, TaskPriority, TaskStatus, now_ms};
pub use session::Session;
pub use stats::TaskStats;
pub use storage::{TaskFile, TaskSink, TaskSource};
pub use store::{Command, HydrationState, Outcome, StoreOptions, TaskHistoryStore};
