use crate::collector::keys::KeyInput;
use crate::collector::messages::InputEvent;
use anyhow::{anyhow, Result};
use chrono::Local;
use rdev::{listen, Button, EventType};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// Converts a raw hook event. `cursor` tracks the last reported pointer
/// position because button events carry no coordinates.
pub fn translate_event(
    cursor: &mut Option<(f64, f64)>,
    event: &EventType,
    name: Option<&str>,
) -> Option<InputEvent> {
    match event {
        EventType::KeyPress(key) => Some(InputEvent::Key(KeyInput::from_rdev(*key, name))),
        EventType::MouseMove { x, y } => {
            *cursor = Some((*x, *y));
            Some(InputEvent::CursorMoved { x: *x, y: *y })
        }
        EventType::ButtonPress(Button::Left) => {
            let (x, y) = (*cursor)?;
            Some(InputEvent::Click {
                x,
                y,
                at: Local::now(),
            })
        }
        _ => None,
    }
}

/// Starts the global keyboard and mouse hook.
///
/// The hook cannot be unregistered; once `tx` is disconnected further events
/// are discarded.
pub fn spawn_input_hook(tx: Sender<InputEvent>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input-hook".to_string())
        .spawn(move || {
            tracing::debug!("starting input hook");
            let hook_tx = tx.clone();
            let mut cursor = None;
            let mut closed = false;
            let result = listen(move |event| {
                if closed {
                    return;
                }
                if let Some(input) = translate_event(&mut cursor, &event.event_type, event.name.as_deref()) {
                    if hook_tx.send(input).is_err() {
                        closed = true;
                    }
                }
            });
            if let Err(err) = result {
                tracing::error!("input hook failed: {err:?}");
                let _ = tx.send(InputEvent::ListenerFailed(format!("{err:?}")));
            }
        })
        .map_err(|err| anyhow!("failed to spawn input hook thread: {err}"))
}
