use crate::collector::capture::ScreenSource;
use crate::collector::coords::{centered_box, ScaleFactor};
use crate::collector::index::PreviewMode;
use crate::collector::layout::{save_png, write_label, DatasetLayout, LabelRecord};
use crate::collector::preview;
use crate::collector::session::BoxSize;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::{DynamicImage, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// One press event together with the session state snapshotted at entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub logical_x: f64,
    pub logical_y: f64,
    pub class_key: char,
    pub class_name: String,
    pub test_mode: bool,
    pub box_size: BoxSize,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Committed {
        index: u32,
        image_path: PathBuf,
        label_path: PathBuf,
        label: LabelRecord,
        preview_path: Option<PathBuf>,
        image_count: usize,
    },
    Tested {
        preview_index: u32,
        preview_path: PathBuf,
    },
}

/// Turns one click into persisted artifacts.
///
/// Callers must serialize calls for the same class: index allocation scans
/// the label directory and then writes into it.
pub struct Orchestrator<S> {
    layout: DatasetLayout,
    scale: ScaleFactor,
    screen: S,
}

impl<S: ScreenSource> Orchestrator<S> {
    pub fn new(layout: DatasetLayout, scale: ScaleFactor, screen: S) -> Self {
        Self {
            layout,
            scale,
            screen,
        }
    }

    pub fn layout(&self) -> &DatasetLayout {
        &self.layout
    }

    pub fn on_click(&mut self, request: &CaptureRequest) -> Result<CaptureOutcome> {
        let frame = self.grab()?;
        if request.test_mode {
            let (preview_index, preview_path) =
                self.write_preview(&frame, request, PreviewMode::Test)?;
            return Ok(CaptureOutcome::Tested {
                preview_index,
                preview_path,
            });
        }

        let (logical_w, logical_h) = self.scale.to_logical_dims(frame.width(), frame.height());
        let stored = preview::downsample(&frame, logical_w, logical_h);
        let (x, y) = self
            .scale
            .to_physical_point(request.logical_x, request.logical_y);
        let label = LabelRecord {
            class_id: request.class_key,
            x,
            y,
            width: logical_w,
            height: logical_h,
        };

        let (index, image_path, label_path) =
            commit_pair(&self.layout, &request.class_name, &stored, &label, write_label)?;
        if let Err(err) = self.layout.append_log(&label) {
            remove_orphan(&label_path);
            remove_orphan(&image_path);
            return Err(err);
        }

        // The pair is committed from here on; a missing preview is only reported.
        let preview_path = match self.committed_preview(request) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(
                    "preview for {} #{:03} skipped: {err:#}",
                    request.class_name,
                    index
                );
                None
            }
        };
        let image_count = self.layout.class_counts(&request.class_name).images;

        Ok(CaptureOutcome::Committed {
            index,
            image_path,
            label_path,
            label,
            preview_path,
            image_count,
        })
    }

    fn grab(&mut self) -> Result<RgbImage> {
        let frame = self.screen.capture_primary()?;
        Ok(DynamicImage::ImageRgba8(frame).into_rgb8())
    }

    /// Re-samples the screen rather than reusing the stored frame.
    fn committed_preview(&mut self, request: &CaptureRequest) -> Result<PathBuf> {
        let frame = self.grab()?;
        let (_, path) = self.write_preview(&frame, request, PreviewMode::Committed)?;
        Ok(path)
    }

    /// Committed previews are captioned with the class key, test previews
    /// with the class name.
    fn write_preview(
        &self,
        frame: &RgbImage,
        request: &CaptureRequest,
        mode: PreviewMode,
    ) -> Result<(u32, PathBuf)> {
        let logical_box = centered_box(
            request.logical_x,
            request.logical_y,
            request.box_size.box_width,
            request.box_size.box_height,
        );
        let rect = self.scale.to_physical_rect(logical_box);
        let caption = match mode {
            PreviewMode::Test => request.class_name.clone(),
            PreviewMode::Committed => request.class_key.to_string(),
        };
        let annotated = preview::render(frame, rect, &caption, self.scale);

        let sequence = self.layout.preview_sequence(&request.class_name, mode);
        let index = sequence
            .next_index()
            .with_context(|| format!("allocate {} index", mode.suffix()))?;
        let path = sequence.path(index);
        save_png(&path, &annotated)?;
        Ok((index, path))
    }
}

/// Writes image then label; a failed label write removes the image again.
fn commit_pair<W>(
    layout: &DatasetLayout,
    class_name: &str,
    stored: &RgbImage,
    label: &LabelRecord,
    write_label: W,
) -> Result<(u32, PathBuf, PathBuf)>
where
    W: FnOnce(&Path, &LabelRecord) -> Result<()>,
{
    let index = layout.label_sequence(class_name).next_index()?;
    let image_path = layout.image_sequence(class_name).path(index);
    let label_path = layout.label_sequence(class_name).path(index);

    save_png(&image_path, stored)?;
    if let Err(err) = write_label(&label_path, label) {
        remove_orphan(&image_path);
        return Err(err);
    }
    Ok((index, image_path, label_path))
}

fn remove_orphan(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("failed to remove partial capture {}: {err}", path.display());
        }
    }
}
