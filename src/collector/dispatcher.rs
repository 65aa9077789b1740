use crate::collector::capture::ScreenSource;
use crate::collector::classes::ClassMap;
use crate::collector::keys::{map_key_to_command, KeyInput};
use crate::collector::messages::{InputEvent, OverlayView};
use crate::collector::orchestrator::{CaptureOutcome, CaptureRequest, Orchestrator};
use crate::collector::session::{Session, Transition};
use crate::settings;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Sole owner of the session; consumes input events one at a time.
///
/// Key handling and captures never interleave, so a class switch cannot land
/// in the middle of a capture and per-class index allocation is single-writer.
pub struct Dispatcher<S> {
    classes: ClassMap,
    session: Session,
    orchestrator: Orchestrator<S>,
    config_path: PathBuf,
    cursor: Option<(f64, f64)>,
    overlay_tx: Option<Sender<OverlayView>>,
    last_outcome: Option<CaptureOutcome>,
}

impl<S: ScreenSource> Dispatcher<S> {
    pub fn new(
        classes: ClassMap,
        session: Session,
        orchestrator: Orchestrator<S>,
        config_path: PathBuf,
    ) -> Self {
        Self {
            classes,
            session,
            orchestrator,
            config_path,
            cursor: None,
            overlay_tx: None,
            last_outcome: None,
        }
    }

    pub fn with_overlay(mut self, overlay_tx: Sender<OverlayView>) -> Self {
        self.overlay_tx = Some(overlay_tx);
        self.publish_overlay();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn last_outcome(&self) -> Option<&CaptureOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn handle(&mut self, event: InputEvent) -> ControlFlow<()> {
        if !self.session.state().running {
            return ControlFlow::Break(());
        }

        match event {
            InputEvent::Key(key) => return self.handle_key(key),
            InputEvent::CursorMoved { x, y } => {
                self.cursor = Some((x, y));
                if self.session.state().test_mode {
                    self.publish_overlay();
                }
            }
            InputEvent::Click { x, y, at } => self.handle_click(x, y, at),
            InputEvent::ListenerFailed(reason) => {
                tracing::warn!("input listener unavailable, capture disabled: {reason}");
            }
        }
        ControlFlow::Continue(())
    }

    /// Drains `events` until quit or until every sender is gone.
    pub fn run(mut self, events: Receiver<InputEvent>) {
        while let Ok(event) = events.recv() {
            if self.handle(event).is_break() {
                break;
            }
        }
        tracing::debug!("dispatcher stopped");
    }

    fn handle_key(&mut self, key: KeyInput) -> ControlFlow<()> {
        let Some(command) = map_key_to_command(&self.classes, key) else {
            tracing::debug!(?key, "ignored key");
            return ControlFlow::Continue(());
        };

        match self.session.apply(command) {
            Transition::ClassSelected(key) => {
                let name = self.classes.name(key).unwrap_or("?");
                tracing::info!("selected class: {name}");
            }
            Transition::TestModeEntered => {
                tracing::info!("test mode: on");
            }
            Transition::TestModeExited { persist } => {
                tracing::info!(
                    "test mode: off, final box size {}x{}",
                    persist.box_width,
                    persist.box_height
                );
                if let Err(err) = settings::save_box_size(&self.config_path, &persist) {
                    tracing::warn!("failed to save box config: {err:#}");
                }
            }
            Transition::Paused => tracing::info!("paused"),
            Transition::Resumed => tracing::info!("running"),
            Transition::BoxResized(size) => {
                tracing::info!("box size: {}x{}", size.box_width, size.box_height);
            }
            Transition::QuitRequested => {
                tracing::info!("quit requested");
                // Closing the overlay channel tells the main loop to stop.
                self.overlay_tx = None;
                return ControlFlow::Break(());
            }
            Transition::Ignored => {}
        }
        self.publish_overlay();
        ControlFlow::Continue(())
    }

    fn handle_click(&mut self, x: f64, y: f64, at: DateTime<Local>) {
        self.cursor = Some((x, y));
        let Some(snapshot) = self.session.capture_gate() else {
            tracing::debug!("click ignored: session not armed");
            return;
        };
        let Some(class_name) = self.classes.name(snapshot.class_key) else {
            tracing::warn!("click ignored: unknown class {:?}", snapshot.class_key);
            return;
        };

        let request = CaptureRequest {
            logical_x: x,
            logical_y: y,
            class_key: snapshot.class_key,
            class_name: class_name.to_string(),
            test_mode: snapshot.test_mode,
            box_size: snapshot.box_size,
            at,
        };

        match self.orchestrator.on_click(&request) {
            Ok(outcome) => {
                report_outcome(&request, &outcome);
                self.last_outcome = Some(outcome);
            }
            Err(err) => {
                tracing::warn!("capture for {class_name} dropped: {err:#}");
            }
        }
    }

    fn publish_overlay(&mut self) {
        let Some(tx) = &self.overlay_tx else {
            return;
        };
        let state = self.session.state();
        let view = OverlayView {
            test_mode: state.test_mode,
            paused: state.paused,
            cursor: self.cursor,
            box_size: self.session.box_size(),
        };
        if tx.send(view).is_err() {
            self.overlay_tx = None;
        }
    }
}

impl<S: ScreenSource + Send + 'static> Dispatcher<S> {
    pub fn spawn(self, events: Receiver<InputEvent>) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("collector-dispatch".to_string())
            .spawn(move || self.run(events))
            .map_err(|err| anyhow!("failed to spawn dispatcher thread: {err}"))
    }
}

fn report_outcome(request: &CaptureRequest, outcome: &CaptureOutcome) {
    match outcome {
        CaptureOutcome::Committed {
            index,
            label_path,
            preview_path,
            image_count,
            ..
        } => {
            let label_name = label_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!(
                "saved {} #{:03} at {}",
                request.class_name,
                index,
                request.at.format("%H:%M:%S")
            );
            tracing::info!("label file: {label_name}");
            if let Some(preview_path) = preview_path {
                tracing::info!("preview saved to {}", preview_path.display());
            }
            tracing::info!("{} now has {} images", request.class_name, image_count);
        }
        CaptureOutcome::Tested { preview_path, .. } => {
            tracing::info!("test preview saved to {}", preview_path.display());
        }
    }
}
