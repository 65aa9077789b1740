use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use screenshots::Screen;

/// Screen-capture backend: one full native-resolution frame per call.
pub trait ScreenSource {
    fn capture_primary(&mut self) -> Result<RgbaImage>;
}

/// Captures the primary display through the `screenshots` backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryDisplay;

impl ScreenSource for PrimaryDisplay {
    fn capture_primary(&mut self) -> Result<RgbaImage> {
        let screens = Screen::all().context("enumerate displays")?;
        let screen = screens
            .iter()
            .find(|screen| screen.display_info.is_primary)
            .or_else(|| screens.first())
            .ok_or_else(|| anyhow!("no display available for capture"))?;
        let frame = screen
            .capture()
            .with_context(|| format!("capture display {}", screen.display_info.id))?;
        if frame.width() == 0 || frame.height() == 0 {
            return Err(anyhow!("display {} returned an empty frame", screen.display_info.id));
        }
        Ok(frame)
    }
}
