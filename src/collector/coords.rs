/// Ratio between logical cursor units and framebuffer pixels.
///
/// Fixed for the lifetime of the process. Label coordinates and preview
/// drawing use physical pixels; stored images use logical resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && value > 0.0 {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    pub fn to_physical_point(self, x: f64, y: f64) -> (u32, u32) {
        (scale_to_u32(x * self.0), scale_to_u32(y * self.0))
    }

    pub fn to_physical_rect(self, rect: LogicalRect) -> PhysicalRect {
        let right = rect.left.saturating_add(rect.width);
        let bottom = rect.top.saturating_add(rect.height);
        PhysicalRect {
            left: scale_to_u32(rect.left as f64 * self.0),
            top: scale_to_u32(rect.top as f64 * self.0),
            right: scale_to_u32(right as f64 * self.0),
            bottom: scale_to_u32(bottom as f64 * self.0),
        }
    }

    /// Floors native capture dimensions down to logical resolution.
    pub fn to_logical_dims(self, width: u32, height: u32) -> (u32, u32) {
        (
            scale_to_u32(width as f64 / self.0).max(1),
            scale_to_u32(height as f64 / self.0).max(1),
        )
    }

    /// Outline width used when annotating native-resolution frames.
    pub fn outline_width(self) -> u32 {
        scale_to_u32(3.0 * self.0).max(1)
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self(2.0)
    }
}

fn scale_to_u32(value: f64) -> u32 {
    value.max(0.0).floor() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Edges are inclusive pixel positions on the native frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

/// Box of `width` x `height` centered on a logical click, top-left clamped at the origin.
pub fn centered_box(x: f64, y: f64, width: u32, height: u32) -> LogicalRect {
    let cx = x.trunc() as i64;
    let cy = y.trunc() as i64;
    let left = (cx - (width / 2) as i64).max(0);
    let top = (cy - (height / 2) as i64).max(0);
    LogicalRect {
        left: left.min(u32::MAX as i64) as u32,
        top: top.min(u32::MAX as i64) as u32,
        width,
        height,
    }
}
