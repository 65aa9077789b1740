use crate::collector::session::BoxSize;
use crate::collector::ticker::{OverlayRect, OverlayWindow};
use anyhow::{Context, Result};
use std::time::Duration;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::EventLoopExtPumpEvents;
use winit::window::{Window, WindowBuilder, WindowLevel};

/// Borderless topmost window driven by the main-thread ticker.
///
/// Must be created and used on the main thread.
pub struct WinitOverlay {
    event_loop: EventLoop<()>,
    window: Window,
    size: (u32, u32),
    visible: bool,
}

impl WinitOverlay {
    pub fn create(initial: BoxSize) -> Result<Self> {
        let event_loop = EventLoop::new().context("create overlay event loop")?;
        let size = (initial.box_width, initial.box_height);
        let window = WindowBuilder::new()
            .with_title("click_labeler overlay")
            .with_decorations(false)
            .with_resizable(false)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(LogicalSize::new(size.0 as f64, size.1 as f64))
            .build(&event_loop)
            .context("create overlay window")?;

        Ok(Self {
            event_loop,
            window,
            size,
            visible: false,
        })
    }
}

impl OverlayWindow for WinitOverlay {
    fn show_at(&mut self, rect: OverlayRect) {
        if self.size != (rect.width, rect.height) {
            self.size = (rect.width, rect.height);
            let _ = self
                .window
                .request_inner_size(LogicalSize::new(rect.width as f64, rect.height as f64));
        }
        self.window
            .set_outer_position(LogicalPosition::new(rect.x as f64, rect.y as f64));
        if !self.visible {
            self.window.set_visible(true);
            self.visible = true;
        }
        self.window.set_window_level(WindowLevel::AlwaysOnTop);
    }

    fn hide(&mut self) {
        if self.visible {
            self.window.set_visible(false);
            self.visible = false;
        }
    }

    fn pump(&mut self) {
        let _ = self
            .event_loop
            .pump_events(Some(Duration::ZERO), |_event, _target| {});
    }
}
