use crate::collector::layout::DatasetLayout;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::PathBuf;

/// Moves a non-empty click log into the archive file and truncates it.
///
/// Must run once at startup before anything appends to the live log. The
/// archive holds only the most recent rollover. Returns the archive path when
/// a rollover happened. The live log exists afterwards either way.
pub fn rollover_log(layout: &DatasetLayout) -> Result<Option<PathBuf>> {
    let log_path = layout.log_path();
    let len = match fs::metadata(&log_path) {
        Ok(meta) => meta.len(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => 0,
        Err(err) => return Err(err).with_context(|| format!("stat {}", log_path.display())),
    };

    if len == 0 {
        layout.ensure_log_file()?;
        return Ok(None);
    }

    let archive_dir = layout.archive_dir();
    fs::create_dir_all(&archive_dir)
        .with_context(|| format!("create {}", archive_dir.display()))?;
    let archive_path = layout.archive_path();
    fs::copy(&log_path, &archive_path).with_context(|| {
        format!(
            "archive {} to {}",
            log_path.display(),
            archive_path.display()
        )
    })?;
    File::create(&log_path).with_context(|| format!("truncate {}", log_path.display()))?;
    Ok(Some(archive_path))
}
