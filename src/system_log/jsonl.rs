//! JSON-lines file storage
//!
//! Each log gets `<directory>/<name>.jsonl`, one serialized event per line.
//! A forced prepare rotates a non-empty file aside to `<name>.<n>.jsonl`
//! and starts a fresh one.

use crate::system_log::storage::{LogStorage, StorageError, StorageResult};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

pub struct JsonLinesStorage<E> {
    directory: PathBuf,
    name: String,
    writer: Option<BufWriter<File>>,
    _events: PhantomData<fn(&E)>,
}

impl<E> JsonLinesStorage<E> {
    pub fn new(directory: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            name: name.into(),
            writer: None,
            _events: PhantomData,
        }
    }

    /// Path of the file currently written to
    pub fn path(&self) -> PathBuf {
        self.directory.join(format!("{}.jsonl", self.name))
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// First `<name>.<n>.jsonl` that does not exist yet
    fn next_rotation_path(&self) -> PathBuf {
        (1..)
            .map(|n| self.directory.join(format!("{}.{}.jsonl", self.name, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or_else(|| self.directory.join(format!("{}.old.jsonl", self.name)))
    }

    fn rotate(&mut self) -> StorageResult<()> {
        let path = self.path();
        let in_use = fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false);
        if !in_use {
            return Ok(());
        }

        self.writer = None;
        let rotated = self.next_rotation_path();
        fs::rename(&path, &rotated).map_err(|e| Self::io_error(&path, e))?;
        log::info!(
            "Rotated system log file {} to {}",
            path.display(),
            rotated.display()
        );
        Ok(())
    }

    fn open(&mut self) -> StorageResult<()> {
        fs::create_dir_all(&self.directory).map_err(|e| Self::io_error(&self.directory, e))?;

        let path = self.path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Self::io_error(&path, e))?;
        self.writer = Some(BufWriter::new(file));
        log::debug!("Opened system log file {}", path.display());
        Ok(())
    }
}

impl<E: Serialize> LogStorage<E> for JsonLinesStorage<E> {
    fn prepare(&mut self, force: bool) -> StorageResult<()> {
        if force {
            self.rotate()?;
            self.writer = None;
        }
        if self.writer.is_none() {
            self.open()?;
        }
        Ok(())
    }

    fn write_batch(&mut self, batch: &[E]) -> StorageResult<()> {
        // Serialize everything first so a bad event writes nothing
        let mut lines = Vec::with_capacity(batch.len() * 128);
        for event in batch {
            serde_json::to_writer(&mut lines, event)?;
            lines.push(b'\n');
        }

        if self.writer.is_none() {
            self.open()?;
        }
        let path = self.path();
        let writer = self.writer.as_mut().ok_or_else(|| StorageError::Unavailable {
            message: format!("{} is not open", path.display()),
        })?;

        write_durably(writer, &lines).map_err(|e| Self::io_error(&path, e))
    }
}

fn write_durably(writer: &mut BufWriter<File>, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_all(bytes)?;
    writer.flush()?;
    writer.get_ref().sync_data()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::QueryLogElement;
    use tempfile::TempDir;

    fn read_lines(path: &Path) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_prepare_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let directory = temp_dir.path().join("nested").join("logs");
        let mut storage = JsonLinesStorage::<QueryLogElement>::new(&directory, "query_log");

        storage.prepare(false).unwrap();

        assert!(directory.is_dir());
        assert!(storage.path().exists());
    }

    #[test]
    fn test_write_batch_appends_one_line_per_event() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonLinesStorage::<QueryLogElement>::new(temp_dir.path(), "query_log");

        storage.prepare(false).unwrap();
        storage
            .write_batch(&[
                QueryLogElement::finished("q-1", "SELECT 1", 3, 1),
                QueryLogElement::finished("q-2", "SELECT 2", 4, 1),
            ])
            .unwrap();
        storage
            .write_batch(&[QueryLogElement::failed("q-3", "SELECT x", "unknown column")])
            .unwrap();

        let lines = read_lines(&storage.path());
        assert_eq!(lines.len(), 3);
        let last: QueryLogElement = serde_json::from_str(&lines[2]).unwrap();
        assert_eq!(last.query_id, "q-3");
        assert_eq!(last.exception.as_deref(), Some("unknown column"));
    }

    #[test]
    fn test_forced_prepare_rotates_non_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut storage = JsonLinesStorage::<QueryLogElement>::new(temp_dir.path(), "query_log");

        storage.prepare(false).unwrap();
        storage
            .write_batch(&[QueryLogElement::finished("q-1", "SELECT 1", 1, 1)])
            .unwrap();

        storage.prepare(true).unwrap();
        storage
            .write_batch(&[QueryLogElement::finished("q-2", "SELECT 2", 1, 1)])
            .unwrap();

        let rotated = temp_dir.path().join("query_log.1.jsonl");
        assert_eq!(read_lines(&rotated).len(), 1);
        assert_eq!(read_lines(&storage.path()).len(), 1);

        // Nothing to rotate: the fresh file is kept
        let mut empty = JsonLinesStorage::<QueryLogElement>::new(temp_dir.path(), "empty_log");
        empty.prepare(true).unwrap();
        assert!(!temp_dir.path().join("empty_log.1.jsonl").exists());
    }

    #[test]
    fn test_write_into_unwritable_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not-a-directory");
        fs::write(&blocker, b"occupied").unwrap();

        let mut storage = JsonLinesStorage::<QueryLogElement>::new(&blocker, "query_log");
        let result = storage.write_batch(&[QueryLogElement::finished("q", "SELECT 1", 1, 1)]);

        assert!(matches!(result, Err(StorageError::Io { .. })));
    }
}
