use serde::{Deserialize, Serialize};

/// Pixels added or removed per arrow-key press.
pub const BOX_STEP: u32 = 5;
pub const DEFAULT_BOX_DIM: u32 = 40;

fn default_box_dim() -> u32 {
    DEFAULT_BOX_DIM
}

/// Overlay/preview box size in logical units. Both dimensions stay >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSize {
    #[serde(default = "default_box_dim")]
    pub box_width: u32,
    #[serde(default = "default_box_dim")]
    pub box_height: u32,
}

impl Default for BoxSize {
    fn default() -> Self {
        Self {
            box_width: DEFAULT_BOX_DIM,
            box_height: DEFAULT_BOX_DIM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxAdjust {
    Taller,
    Shorter,
    Wider,
    Narrower,
}

impl BoxSize {
    pub fn new(box_width: u32, box_height: u32) -> Self {
        let mut size = Self {
            box_width,
            box_height,
        };
        size.sanitize();
        size
    }

    pub fn sanitize(&mut self) {
        self.box_width = self.box_width.max(1);
        self.box_height = self.box_height.max(1);
    }

    pub fn adjust(&mut self, adjust: BoxAdjust) {
        match adjust {
            BoxAdjust::Taller => self.box_height = self.box_height.saturating_add(BOX_STEP),
            BoxAdjust::Shorter => self.box_height = self.box_height.saturating_sub(BOX_STEP),
            BoxAdjust::Wider => self.box_width = self.box_width.saturating_add(BOX_STEP),
            BoxAdjust::Narrower => self.box_width = self.box_width.saturating_sub(BOX_STEP),
        }
        self.sanitize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Selecting,
    Armed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub selected_class: Option<char>,
    pub test_mode: bool,
    pub paused: bool,
    pub running: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            selected_class: None,
            test_mode: false,
            paused: false,
            running: true,
        }
    }
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        if self.selected_class.is_some() {
            SessionPhase::Armed
        } else {
            SessionPhase::Selecting
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    SelectClass(char),
    ToggleTestMode,
    TogglePause,
    ResizeBox(BoxAdjust),
    Quit,
}

/// What a command changed; the dispatcher turns these into side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    ClassSelected(char),
    TestModeEntered,
    /// Leaving test mode persists the box size that was tuned during it.
    TestModeExited { persist: BoxSize },
    Paused,
    Resumed,
    BoxResized(BoxSize),
    QuitRequested,
    /// The session already stopped; nothing changed.
    Ignored,
}

/// State captured once at click time and used for the whole capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSnapshot {
    pub class_key: char,
    pub test_mode: bool,
    pub box_size: BoxSize,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    state: SessionState,
    box_size: BoxSize,
}

impl Session {
    pub fn new(box_size: BoxSize) -> Self {
        Self {
            state: SessionState::default(),
            box_size,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn box_size(&self) -> BoxSize {
        self.box_size
    }

    pub fn apply(&mut self, command: SessionCommand) -> Transition {
        if !self.state.running {
            return Transition::Ignored;
        }

        match command {
            SessionCommand::SelectClass(key) => {
                self.state.selected_class = Some(key);
                Transition::ClassSelected(key)
            }
            SessionCommand::ToggleTestMode => {
                self.state.test_mode = !self.state.test_mode;
                if self.state.test_mode {
                    Transition::TestModeEntered
                } else {
                    Transition::TestModeExited {
                        persist: self.box_size,
                    }
                }
            }
            SessionCommand::TogglePause => {
                self.state.paused = !self.state.paused;
                if self.state.paused {
                    Transition::Paused
                } else {
                    Transition::Resumed
                }
            }
            SessionCommand::ResizeBox(adjust) => {
                self.box_size.adjust(adjust);
                Transition::BoxResized(self.box_size)
            }
            SessionCommand::Quit => {
                self.state.running = false;
                Transition::QuitRequested
            }
        }
    }

    /// Snapshot for a click, or `None` unless running, unpaused and armed.
    pub fn capture_gate(&self) -> Option<CaptureSnapshot> {
        if !self.state.running || self.state.paused {
            return None;
        }
        let class_key = self.state.selected_class?;
        Some(CaptureSnapshot {
            class_key,
            test_mode: self.state.test_mode,
            box_size: self.box_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_selecting_and_running() {
        let session = Session::new(BoxSize::default());
        let state = session.state();
        assert_eq!(state.phase(), SessionPhase::Selecting);
        assert!(state.running);
        assert!(!state.test_mode);
        assert!(!state.paused);
        assert_eq!(session.capture_gate(), None);
    }

    #[test]
    fn selecting_a_class_arms_capture() {
        let mut session = Session::new(BoxSize::default());
        assert_eq!(
            session.apply(SessionCommand::SelectClass('2')),
            Transition::ClassSelected('2')
        );
        assert_eq!(session.state().phase(), SessionPhase::Armed);
        assert_eq!(
            session.capture_gate(),
            Some(CaptureSnapshot {
                class_key: '2',
                test_mode: false,
                box_size: BoxSize::default(),
            })
        );
    }

    #[test]
    fn pause_blocks_capture_until_resumed() {
        let mut session = Session::new(BoxSize::default());
        session.apply(SessionCommand::SelectClass('1'));
        assert_eq!(session.apply(SessionCommand::TogglePause), Transition::Paused);
        assert_eq!(session.capture_gate(), None);
        assert_eq!(session.apply(SessionCommand::TogglePause), Transition::Resumed);
        assert!(session.capture_gate().is_some());
    }

    #[test]
    fn leaving_test_mode_reports_box_to_persist() {
        let mut session = Session::new(BoxSize::default());
        assert_eq!(
            session.apply(SessionCommand::ToggleTestMode),
            Transition::TestModeEntered
        );
        session.apply(SessionCommand::ResizeBox(BoxAdjust::Wider));
        session.apply(SessionCommand::ResizeBox(BoxAdjust::Shorter));
        assert_eq!(
            session.apply(SessionCommand::ToggleTestMode),
            Transition::TestModeExited {
                persist: BoxSize::new(45, 35)
            }
        );
    }

    #[test]
    fn box_dimensions_clamp_at_one() {
        let mut size = BoxSize::new(7, 3);
        size.adjust(BoxAdjust::Narrower);
        size.adjust(BoxAdjust::Shorter);
        assert_eq!(size, BoxSize::new(2, 1));
        size.adjust(BoxAdjust::Narrower);
        assert_eq!(size.box_width, 1);
        assert_eq!(BoxSize::new(0, 0), BoxSize::new(1, 1));
    }

    #[test]
    fn quit_is_terminal() {
        let mut session = Session::new(BoxSize::default());
        session.apply(SessionCommand::SelectClass('1'));
        assert_eq!(session.apply(SessionCommand::Quit), Transition::QuitRequested);
        assert!(!session.state().running);
        assert_eq!(session.capture_gate(), None);
        assert_eq!(
            session.apply(SessionCommand::SelectClass('3')),
            Transition::Ignored
        );
        assert_eq!(session.apply(SessionCommand::Quit), Transition::Ignored);
        assert_eq!(session.state().selected_class, Some('1'));
    }
}
