use crate::collector::classes::ClassMap;
use crate::collector::index::{PreviewMode, Sequence};
use anyhow::{Context, Result};
use image::RgbImage;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const LOG_DIR: &str = "log";
pub const ARCHIVE_SUBDIR: &str = "archive";
pub const PREVIEWS_DIR: &str = "previews";
pub const LOG_FILE_NAME: &str = "click_log.txt";
pub const ARCHIVE_FILE_NAME: &str = "click_log_archive.txt";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Bounding-box annotation in physical pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelRecord {
    pub class_id: char,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl LabelRecord {
    pub fn to_line(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for LabelRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.class_id, self.x, self.y, self.width, self.height
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtifactCounts {
    pub images: usize,
    pub labels: usize,
}

/// Fixed on-disk layout of the dataset rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    root: PathBuf,
}

impl DatasetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self, class_name: &str) -> PathBuf {
        self.root.join(IMAGES_DIR).join(class_name)
    }

    pub fn labels_dir(&self, class_name: &str) -> PathBuf {
        self.root.join(LABELS_DIR).join(class_name)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.log_dir().join(ARCHIVE_SUBDIR)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir().join(ARCHIVE_FILE_NAME)
    }

    pub fn previews_dir(&self) -> PathBuf {
        self.root.join(PREVIEWS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn label_sequence(&self, class_name: &str) -> Sequence {
        Sequence::new(self.labels_dir(class_name), format!("{class_name}_"), "txt")
    }

    pub fn image_sequence(&self, class_name: &str) -> Sequence {
        Sequence::new(self.images_dir(class_name), format!("{class_name}_"), "png")
    }

    pub fn preview_sequence(&self, class_name: &str, mode: PreviewMode) -> Sequence {
        Sequence::new(
            self.previews_dir(),
            format!("{class_name}_{}_", mode.suffix()),
            "png",
        )
    }

    pub fn ensure_dirs(&self, classes: &ClassMap) -> Result<()> {
        let mut dirs = Vec::with_capacity(classes.len() * 2 + 3);
        for (_, name) in classes.iter() {
            dirs.push(self.images_dir(name));
            dirs.push(self.labels_dir(name));
        }
        dirs.push(self.log_dir());
        dirs.push(self.archive_dir());
        dirs.push(self.previews_dir());

        for dir in dirs {
            fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn ensure_log_file(&self) -> Result<()> {
        let path = self.log_path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("create {}", path.display()))?;
        Ok(())
    }

    pub fn append_log(&self, record: &LabelRecord) -> Result<()> {
        let path = self.log_path();
        ensure_parent(&path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        file.write_all(record.to_line().as_bytes())
            .with_context(|| format!("append to {}", path.display()))
    }

    pub fn class_counts(&self, class_name: &str) -> ArtifactCounts {
        ArtifactCounts {
            images: count_with_extension(&self.images_dir(class_name), "png"),
            labels: count_with_extension(&self.labels_dir(class_name), "txt"),
        }
    }
}

pub fn write_label(path: &Path, record: &LabelRecord) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, record.to_line()).with_context(|| format!("write label {}", path.display()))
}

pub fn save_png(path: &Path, image: &RgbImage) -> Result<()> {
    ensure_parent(path)?;
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("save image {}", path.display()))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}

fn count_with_extension(dir: &Path, extension: &str) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_line_matches_on_disk_format() {
        let record = LabelRecord {
            class_id: '1',
            x: 200,
            y: 400,
            width: 720,
            height: 450,
        };
        assert_eq!(record.to_line(), "1 200 400 720 450\n");
    }

    #[test]
    fn paths_follow_fixed_layout() {
        let layout = DatasetLayout::new("/data");
        assert_eq!(
            layout.label_sequence("lvs").path(7),
            Path::new("/data/labels/lvs/lvs_007.txt")
        );
        assert_eq!(
            layout.image_sequence("lvs").path(7),
            Path::new("/data/images/lvs/lvs_007.png")
        );
        assert_eq!(
            layout.preview_sequence("lvs", PreviewMode::Committed).path(0),
            Path::new("/data/previews/lvs_normal_preview_000.png")
        );
        assert_eq!(
            layout.preview_sequence("lvs", PreviewMode::Test).path(12),
            Path::new("/data/previews/lvs_preview_012.png")
        );
        assert_eq!(
            layout.archive_path(),
            Path::new("/data/log/archive/click_log_archive.txt")
        );
        assert_eq!(layout.config_path(), Path::new("/data/config.json"));
    }

    #[test]
    fn ensure_dirs_creates_every_partition() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = DatasetLayout::new(dir.path());
        let classes = ClassMap::default();
        layout.ensure_dirs(&classes).expect("ensure dirs");
        for (_, name) in classes.iter() {
            assert!(layout.images_dir(name).is_dir());
            assert!(layout.labels_dir(name).is_dir());
        }
        assert!(layout.archive_dir().is_dir());
        assert!(layout.previews_dir().is_dir());
    }

    #[test]
    fn append_log_accumulates_lines() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = DatasetLayout::new(dir.path());
        fs::create_dir_all(layout.log_dir()).expect("log dir");
        let first = LabelRecord {
            class_id: '2',
            x: 1,
            y: 2,
            width: 3,
            height: 4,
        };
        let second = LabelRecord { x: 9, ..first };
        layout.append_log(&first).expect("append");
        layout.append_log(&second).expect("append");
        let contents = fs::read_to_string(layout.log_path()).expect("read log");
        assert_eq!(contents, "2 1 2 3 4\n2 9 2 3 4\n");
    }

    #[test]
    fn counts_ignore_other_extensions() {
        let dir = tempfile::tempdir().expect("temp dir");
        let layout = DatasetLayout::new(dir.path());
        let images = layout.images_dir("lvs");
        fs::create_dir_all(&images).expect("images dir");
        for name in ["lvs_000.png", "lvs_001.PNG", "notes.txt"] {
            fs::write(images.join(name), b"").expect("touch");
        }
        let counts = layout.class_counts("lvs");
        assert_eq!(counts.images, 2);
        assert_eq!(counts.labels, 0);
    }
}
