use crate::collector::classes::ClassMap;
use crate::collector::coords::ScaleFactor;
use crate::collector::session::BoxSize;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Overrides the dataset root, which otherwise sits beside the executable.
pub const HOME_ENV: &str = "CLICK_LABELER_HOME";
pub const DEBUG_ENV: &str = "CLICK_LABELER_DEBUG";
pub const TRACE_FILE_ENV: &str = "CLICK_LABELER_TRACE_FILE";

/// Process-wide settings fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub base_dir: PathBuf,
    pub scale_factor: ScaleFactor,
    pub classes: ClassMap,
}

impl CollectorConfig {
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            scale_factor: ScaleFactor::default(),
            classes: ClassMap::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let base_dir = match std::env::var_os(HOME_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let exe_path = std::env::current_exe().context("resolve current executable")?;
                base_dir_from_exe_path(&exe_path)?
            }
        };
        Ok(Self::with_base_dir(base_dir))
    }
}

pub fn base_dir_from_exe_path(exe_path: &Path) -> Result<PathBuf> {
    exe_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("executable path has no parent: {}", exe_path.display()))
}

pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|value| matches!(value.trim(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Reads `config.json`. A missing or blank file yields the defaults.
pub fn load_box_size(path: &Path) -> Result<BoxSize> {
    if !path.exists() {
        return Ok(BoxSize::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read box config {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(BoxSize::default());
    }

    let mut loaded: BoxSize = serde_json::from_str(&content)
        .with_context(|| format!("deserialize box config {}", path.display()))?;
    loaded.sanitize();
    Ok(loaded)
}

pub fn load_box_size_or_default(path: &Path) -> BoxSize {
    match load_box_size(path) {
        Ok(size) => size,
        Err(err) => {
            tracing::warn!("failed to load box config, using defaults: {err:#}");
            BoxSize::default()
        }
    }
}

pub fn save_box_size(path: &Path, size: &BoxSize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create config parent folder {}", parent.display()))?;
    }

    let mut sanitized = *size;
    sanitized.sanitize();
    let json = serde_json::to_string_pretty(&sanitized).context("serialize box config")?;
    std::fs::write(path, json).with_context(|| format!("write box config {}", path.display()))
}
