use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use fs2::FileExt;
use serde::Deserialize;
use storage_corpus::store::fs::atomic_write;

use crate::{FeedbackEntry, FeedbackError, FeedbackLog};

/// Whole-document format written by earlier releases.
#[derive(Debug, Deserialize)]
struct LegacyDocument {
    feedback: Vec<FeedbackEntry>,
}

/// JSON Lines feedback log: one entry per line, appended under an exclusive
/// advisory lock on a sidecar `.lock` file.
#[derive(Debug)]
pub struct JsonlFeedbackLog {
    path: PathBuf,
    writer: Mutex<()>,
}

impl JsonlFeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Lines are decoded independently so a torn or non-UTF-8 line only
    /// costs that line.
    fn parse(&self, bytes: &[u8]) -> Vec<FeedbackEntry> {
        if let Some(document) = parse_legacy(bytes) {
            tracing::debug!(path = %self.path.display(), "reading legacy feedback document");
            return document.feedback;
        }
        let mut entries = Vec::new();
        for (index, line) in bytes.split(|byte| *byte == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            match serde_json::from_slice::<FeedbackEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %err,
                    "skipping unparseable feedback line"
                ),
            }
        }
        entries
    }

    /// Runs with the file lock held: convert a legacy document to JSON Lines
    /// and make sure the next append starts on a fresh line.
    fn prepare_for_append(&self) -> Result<bool, FeedbackError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        if let Some(document) = parse_legacy(&bytes) {
            let mut converted = String::new();
            for entry in &document.feedback {
                converted.push_str(&serde_json::to_string(entry)?);
                converted.push('\n');
            }
            atomic_write(&self.path, converted.as_bytes())?;
            tracing::info!(
                path = %self.path.display(),
                entries = document.feedback.len(),
                "migrated legacy feedback document to JSON Lines"
            );
            return Ok(false);
        }
        Ok(bytes.last().is_some_and(|byte| *byte != b'\n'))
    }

    fn write_line(&self, line: &str, needs_newline: bool) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_newline {
            file.write_all(b"\n")?;
        }
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
        file.sync_data()
    }
}

fn parse_legacy(bytes: &[u8]) -> Option<LegacyDocument> {
    let first = bytes.iter().find(|byte| !byte.is_ascii_whitespace())?;
    if *first != b'{' {
        return None;
    }
    serde_json::from_slice::<LegacyDocument>(bytes).ok()
}

impl FeedbackLog for JsonlFeedbackLog {
    fn load(&self) -> Vec<FeedbackEntry> {
        match fs::read(&self.path) {
            Ok(bytes) => self.parse(&bytes),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %self.path.display(),
                    "feedback log missing; continuing without feedback"
                );
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "feedback log unreadable; continuing without feedback"
                );
                Vec::new()
            }
        }
    }

    fn append(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError> {
        let line = serde_json::to_string(entry)?;
        let _guard = self.writer.lock().map_err(|_| FeedbackError::LockPoisoned)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock = File::create(self.lock_path())?;
        lock.lock_exclusive()?;
        let written = self
            .prepare_for_append()
            .and_then(|needs_newline| Ok(self.write_line(&line, needs_newline)?));
        let unlocked = lock.unlock();
        written?;
        unlocked?;
        tracing::info!(
            path = %self.path.display(),
            entry_id = %entry.entry_id,
            selected = entry.selected_profiles.len(),
            "feedback appended"
        );
        Ok(())
    }
}
