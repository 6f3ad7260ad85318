// JSONL file operations

use eyre::{Context, Result};
use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Sibling file that readers and writers of `path` lock
///
/// The data file itself is replaced by rename on every write, so locking it
/// would not serialize anything.
pub fn lock_path(path: &Path) -> PathBuf {
    path.with_extension("jsonl.lock")
}

fn open_lock(path: &Path) -> Result<File> {
    let lock_file = lock_path(path);
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_file)
        .with_context(|| format!("Failed to open lock file: {}", lock_file.display()))
}

/// Read every record from a JSONL file, in file order
///
/// A missing file reads as an empty list. Blank lines are skipped; a line that
/// fails to parse fails the whole read with its line number.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        debug!(file = ?path, "JSONL file missing, treating as empty");
        return Ok(Vec::new());
    }

    let lock = open_lock(path)?;
    lock.lock_shared().context("Failed to acquire read lock")?;

    let file = File::open(path).with_context(|| format!("Failed to open JSONL file: {}", path.display()))?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

        if line.trim().is_empty() {
            continue;
        }

        let record: T =
            serde_json::from_str(&line).with_context(|| format!("Failed to parse record at line {}", line_num + 1))?;
        records.push(record);
    }

    info!(file = ?path, count = records.len(), "Loaded records from JSONL");

    Ok(records)
}

/// Replace a JSONL file with the given records
///
/// Holds an exclusive lock on the sibling lock file while it writes a temp file
/// and renames it over the target, so readers never see a half-written list.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let lock = open_lock(path)?;
    lock.lock_exclusive().context("Failed to acquire file lock")?;

    let temp_path = path.with_extension("jsonl.tmp");

    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        for record in records {
            let json = serde_json::to_string(record).context("Failed to serialize record")?;
            writeln!(writer, "{}", json)?;
        }
        writer.flush()?;
        file.sync_all()?; // Ensure data is flushed to disk
    }

    fs::rename(&temp_path, path).with_context(|| format!("Failed to replace JSONL file: {}", path.display()))?;
    drop(lock);

    debug!(file = ?path, count = records.len(), "Wrote records to JSONL");
    Ok(())
}
