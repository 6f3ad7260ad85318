// Data models for TaskMaster

use crate::error::StoreError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque task identifier, assigned by whoever creates the task
pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    /// Status after a toggle: COMPLETED goes back to TODO, anything else completes
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Completed => TaskStatus::Todo,
            TaskStatus::Todo | TaskStatus::InProgress => TaskStatus::Completed,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| StoreError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "LOW",
            TaskPriority::Medium => "MEDIUM",
            TaskPriority::High => "HIGH",
            TaskPriority::Urgent => "URGENT",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        TaskPriority::ALL
            .into_iter()
            .find(|priority| priority.as_str() == normalized)
            .ok_or_else(|| StoreError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace(['-', ' '], "_")
}

/// A single task record
///
/// Only `id` and `status` carry meaning for the history store. Everything else
/// is payload that is copied verbatim, including fields this version does not
/// know about (kept in `extra` so exports round-trip).
///
/// Missing or null text fields read as empty strings. `dueDate` is always
/// written, as `null` when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
            priority: TaskPriority::Medium,
            due_date: None,
            created_at: now_ms(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");

        let status: TaskStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }

    #[test]
    fn test_status_toggled() {
        assert_eq!(TaskStatus::Todo.toggled(), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::Todo);
        assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
    }

    #[test]
    fn test_parse_status_and_priority() {
        assert_eq!("in-progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("in progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("Urgent".parse::<TaskPriority>().unwrap(), TaskPriority::Urgent);
        assert!("blocked".parse::<TaskStatus>().is_err());
        assert!("critical".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Low < TaskPriority::Medium);
        assert!(TaskPriority::High < TaskPriority::Urgent);
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let task = Task::new("t-1", "Write report")
            .with_priority(TaskPriority::High)
            .with_due_date("2026-11-01");

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":\"2026-11-01\""));
        assert!(json.contains("\"createdAt\":"));
        assert!(json.contains("\"priority\":\"HIGH\""));
    }

    #[test]
    fn test_task_keeps_unknown_fields() {
        let raw = r#"{"id":"t-1","title":"Call mom","status":"TODO","priority":"LOW","tags":["home"],"createdAt":5}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.extra.get("tags"), Some(&serde_json::json!(["home"])));

        let back: serde_json::Value = serde_json::to_value(&task).unwrap();
        assert_eq!(back["tags"], serde_json::json!(["home"]));
        assert_eq!(back["createdAt"], serde_json::json!(5));
    }

    #[test]
    fn test_task_defaults_for_missing_fields() {
        let task: Task = serde_json::from_str(r#"{"id":"t-2","title":"Bare"}"#).unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.description, "");
        assert_eq!(task.created_at, 0);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_task_tolerates_null_and_missing_text() {
        let raw = r#"{"id":"t-3","description":null,"dueDate":null}"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.title, "");
        assert_eq!(task.description, "");

        let task: Task = serde_json::from_str(r#"{"id":"t-4","title":null}"#).unwrap();
        assert_eq!(task.title, "");
    }

    #[test]
    fn test_null_due_date_is_written_back() {
        let task: Task = serde_json::from_str(r#"{"id":"t-5","title":"Plan","dueDate":null}"#).unwrap();
        assert!(task.due_date.is_none());

        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back.get("dueDate"), Some(&serde_json::Value::Null));
        assert!(!task.extra.contains_key("dueDate"));
    }
}
