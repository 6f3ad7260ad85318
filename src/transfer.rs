// Bulk import/export of the task list as a JSON array

use crate::models::Task;
use chrono::NaiveDate;
use eyre::{Context, Result, eyre};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used for an export taken on `date`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("tasks-export-{}.json", date.format("%Y-%m-%d"))
}

pub fn export_json(tasks: &[Task]) -> Result<String> {
    serde_json::to_string_pretty(tasks).context("Failed to serialize tasks for export")
}

/// Write an export into `dir`, returning the file path
pub fn export_to_dir(dir: &Path, tasks: &[Task], date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create export directory: {}", dir.display()))?;

    let path = dir.join(export_file_name(date));
    fs::write(&path, export_json(tasks)?).with_context(|| format!("Failed to write export: {}", path.display()))?;

    info!(file = ?path, count = tasks.len(), "Exported tasks");
    Ok(path)
}

/// Parse an import payload
///
/// Anything that is not a JSON array is rejected here so it never reaches the
/// store.
pub fn parse_import(payload: &str) -> Result<Vec<Task>> {
    let value: serde_json::Value = serde_json::from_str(payload).context("Invalid JSON file")?;

    if !value.is_array() {
        return Err(eyre!("Invalid import: expected a JSON array of tasks"));
    }

    serde_json::from_value(value).context("Invalid task record in import")
}

pub fn import_from_path(path: &Path) -> Result<Vec<Task>> {
    let payload =
        fs::read_to_string(path).with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let tasks = parse_import(&payload)?;
    info!(file = ?path, count = tasks.len(), "Parsed import file");
    Ok(tasks)
}
