use crate::collector::keys::KeyInput;
use crate::collector::session::BoxSize;
use chrono::{DateTime, Local};

/// Everything the input hook delivers to the dispatcher, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(KeyInput),
    CursorMoved { x: f64, y: f64 },
    /// Left-button press at the last known logical cursor position.
    Click { x: f64, y: f64, at: DateTime<Local> },
    ListenerFailed(String),
}

/// What the overlay ticker needs to place the indicator window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayView {
    pub test_mode: bool,
    pub paused: bool,
    pub cursor: Option<(f64, f64)>,
    pub box_size: BoxSize,
}

impl OverlayView {
    pub fn hidden(box_size: BoxSize) -> Self {
        Self {
            test_mode: false,
            paused: false,
            cursor: None,
            box_size,
        }
    }
}
