use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

/// Byte-span replacement with verification.
///
/// Mutations work on trees; writing a result back to disk compiles down to
/// this single primitive, so a file that changed since it was parsed is
/// refused instead of overwritten.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until applied"]
pub struct Edit {
    pub file: PathBuf,
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    pub new_text: String,
    /// What we expect to find at `[byte_start, byte_end)` before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    ExactMatch(String),
    /// xxh3 hash of the expected text, used for large spans
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Exact match for short text, hash above 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("before-text verification failed at {file}:{byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid byte range [{byte_start}, {byte_end}) in text of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },

    #[error("byte range [{byte_start}, {byte_end}) does not fall on character boundaries")]
    NotCharBoundary { byte_start: usize, byte_end: usize },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already holds `new_text`.
    AlreadyApplied { file: PathBuf },
    /// Before and after were identical; nothing to write.
    Unchanged { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self {
            file: file.into(),
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: EditVerification::from_text(expected_before.as_ref()),
        }
    }

    /// The smallest single edit turning `before` into `after`: the span
    /// between their common prefix and common suffix. `None` when the texts
    /// are equal.
    pub fn from_rewrite(file: impl Into<PathBuf>, before: &str, after: &str) -> Option<Self> {
        if before == after {
            return None;
        }
        let prefix: usize = before
            .chars()
            .zip(after.chars())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .sum();
        let room = before.len().min(after.len()) - prefix;
        let suffix: usize = before[prefix..]
            .chars()
            .rev()
            .zip(after[prefix..].chars().rev())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .scan(0usize, |total, width| {
                *total += width;
                (*total <= room).then_some(width)
            })
            .sum();
        let byte_end = before.len() - suffix;
        Some(Self::new(
            file,
            prefix,
            byte_end,
            &after[prefix..after.len() - suffix],
            &before[prefix..byte_end],
        ))
    }

    /// Check the span against `content` and return the text currently there.
    fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        if self.byte_start > self.byte_end || self.byte_end > content.len() {
            return Err(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            });
        }
        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::NotCharBoundary {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
            })?;
        if current == self.new_text || self.expected_before.matches(current) {
            return Ok(current);
        }
        Err(EditError::BeforeTextMismatch {
            file: self.file.clone(),
            byte_start: self.byte_start,
            byte_end: self.byte_end,
            found: current.to_string(),
        })
    }

    /// Apply to in-memory text.
    pub fn apply_to_str(&self, content: &str) -> Result<String, EditError> {
        let current = self.validate(content)?;
        if current == self.new_text {
            return Ok(content.to_string());
        }
        let mut out = String::with_capacity(content.len() + self.new_text.len());
        out.push_str(&content[..self.byte_start]);
        out.push_str(&self.new_text);
        out.push_str(&content[self.byte_end..]);
        Ok(out)
    }

    /// Apply to the file on disk atomically (tempfile, fsync, rename).
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let original = String::from_utf8(fs::read(&self.file)?)?;
        let current = self.validate(&original)?;
        if current == self.new_text {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }
        let updated = self.apply_to_str(&original)?;
        atomic_write(&self.file, updated.as_bytes())?;
        debug!(
            file = %self.file.display(),
            start = self.byte_start,
            end = self.byte_end,
            "applied edit"
        );
        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_text.len(),
        })
    }
}

/// Write `after` over `file`, whose contents are expected to be `before`.
pub fn write_rewrite(file: &Path, before: &str, after: &str) -> Result<EditResult, EditError> {
    match Edit::from_rewrite(file, before, after) {
        Some(edit) => edit.apply(),
        None => Ok(EditResult::Unchanged {
            file: file.to_path_buf(),
        }),
    }
}

/// Atomic file write: tempfile in the same directory, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
