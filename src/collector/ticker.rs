use crate::collector::messages::OverlayView;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

/// Roughly 20 Hz.
pub const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Logical screen rectangle for the indicator window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// The borderless always-on-top indicator; the ticker only places it.
pub trait OverlayWindow {
    /// Moves/resizes the window to `rect`, makes it visible and topmost.
    fn show_at(&mut self, rect: OverlayRect);
    fn hide(&mut self);
    /// Lets the windowing backend process pending events.
    fn pump(&mut self) {}
}

/// Where the indicator should be for `view`, or `None` to hide it.
pub fn overlay_placement(view: &OverlayView) -> Option<OverlayRect> {
    if !view.test_mode || view.paused {
        return None;
    }
    let (x, y) = view.cursor?;
    let width = view.box_size.box_width;
    let height = view.box_size.box_height;
    Some(OverlayRect {
        x: x.trunc() as i32 - (width / 2) as i32,
        y: y.trunc() as i32 - (height / 2) as i32,
        width,
        height,
    })
}

pub struct OverlayTicker<W> {
    window: W,
    views: Receiver<OverlayView>,
    view: OverlayView,
}

impl<W: OverlayWindow> OverlayTicker<W> {
    pub fn new(window: W, views: Receiver<OverlayView>, initial: OverlayView) -> Self {
        Self {
            window,
            views,
            view: initial,
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    /// Applies the latest view. Returns `false` once the dispatcher has gone away.
    pub fn tick(&mut self) -> bool {
        loop {
            match self.views.try_recv() {
                Ok(view) => self.view = view,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.window.hide();
                    self.window.pump();
                    return false;
                }
            }
        }

        match overlay_placement(&self.view) {
            Some(rect) => self.window.show_at(rect),
            None => self.window.hide(),
        }
        self.window.pump();
        true
    }

    /// Blocks the calling thread until the dispatcher stops.
    pub fn run(&mut self) {
        while self.tick() {
            thread::sleep(TICK_INTERVAL);
        }
    }

    pub fn into_window(self) -> W {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::session::BoxSize;
    use std::sync::mpsc::channel;

    #[derive(Debug, Default)]
    struct RecordingWindow {
        shown: Vec<OverlayRect>,
        hides: usize,
    }

    impl OverlayWindow for RecordingWindow {
        fn show_at(&mut self, rect: OverlayRect) {
            self.shown.push(rect);
        }

        fn hide(&mut self) {
            self.hides += 1;
        }
    }

    fn view(test_mode: bool, paused: bool, cursor: Option<(f64, f64)>) -> OverlayView {
        OverlayView {
            test_mode,
            paused,
            cursor,
            box_size: BoxSize::new(40, 20),
        }
    }

    #[test]
    fn placement_centers_box_on_cursor() {
        assert_eq!(
            overlay_placement(&view(true, false, Some((100.6, 50.0)))),
            Some(OverlayRect {
                x: 80,
                y: 40,
                width: 40,
                height: 20
            })
        );
        assert_eq!(
            overlay_placement(&view(true, false, Some((3.0, 3.0)))).map(|r| (r.x, r.y)),
            Some((-17, -7))
        );
    }

    #[test]
    fn hidden_outside_active_test_mode() {
        assert_eq!(overlay_placement(&view(false, false, Some((1.0, 1.0)))), None);
        assert_eq!(overlay_placement(&view(true, true, Some((1.0, 1.0)))), None);
        assert_eq!(overlay_placement(&view(true, false, None)), None);
    }

    #[test]
    fn ticker_applies_latest_view_and_stops_on_disconnect() {
        let (tx, rx) = channel();
        let mut ticker = OverlayTicker::new(
            RecordingWindow::default(),
            rx,
            OverlayView::hidden(BoxSize::default()),
        );

        assert!(ticker.tick());
        assert_eq!(ticker.window().hides, 1);

        tx.send(view(true, false, Some((10.0, 10.0)))).expect("send");
        tx.send(view(true, false, Some((60.0, 30.0)))).expect("send");
        assert!(ticker.tick());
        assert_eq!(ticker.window().shown.len(), 1);
        assert_eq!(ticker.window().shown[0].x, 40);

        drop(tx);
        assert!(!ticker.tick());
        let window = ticker.into_window();
        assert_eq!(window.hides, 2);
        assert_eq!(window.shown.len(), 1);
    }
}
