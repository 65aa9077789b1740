use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The two preview numbering sequences kept per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewMode {
    /// Test-mode captures that persist nothing else.
    Test,
    /// The preview written alongside a committed image/label pair.
    Committed,
}

impl PreviewMode {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Test => "preview",
            Self::Committed => "normal_preview",
        }
    }
}

/// A numbered family of files `<prefix><index:03>.<extension>` in one directory.
///
/// The next index is re-derived from the directory on every allocation, so a
/// sequence is only safe with a single writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    dir: PathBuf,
    prefix: String,
    extension: &'static str,
}

impl Sequence {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, extension: &'static str) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            extension,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name(&self, index: u32) -> String {
        format!("{}{:03}.{}", self.prefix, index, self.extension)
    }

    pub fn path(&self, index: u32) -> PathBuf {
        self.dir.join(self.file_name(index))
    }

    /// Index embedded in `file_name`, or `None` when it does not belong to this sequence.
    pub fn parse_index(&self, file_name: &str) -> Option<u32> {
        let digits = file_name
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.extension)?
            .strip_suffix('.')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// `max(existing) + 1`, or `0` when the directory holds no member.
    ///
    /// Gaps are never refilled.
    pub fn next_index(&self) -> Result<u32> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(0),
            Err(err) => {
                return Err(err).with_context(|| format!("scan {}", self.dir.display()));
            }
        };

        let mut highest: Option<u32> = None;
        for entry in entries {
            let entry = entry.with_context(|| format!("scan {}", self.dir.display()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(index) = self.parse_index(name) {
                highest = Some(highest.map_or(index, |h| h.max(index)));
            }
        }
        Ok(highest.map_or(0, |h| h.saturating_add(1)))
    }
}
