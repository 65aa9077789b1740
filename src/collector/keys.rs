use crate::collector::classes::ClassMap;
use crate::collector::session::{BoxAdjust, SessionCommand};
use rdev::Key;

pub const TEST_MODE_KEY: char = 't';
pub const PAUSE_KEY: char = 'p';
pub const QUIT_KEY: char = 'q';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Other,
}

impl KeyInput {
    /// Prefers the character the OS reported; falls back to the key code.
    ///
    /// A control character name means a modifier was held, and the press is
    /// ignored.
    pub fn from_rdev(key: Key, name: Option<&str>) -> Self {
        match key {
            Key::UpArrow => return Self::Up,
            Key::DownArrow => return Self::Down,
            Key::LeftArrow => return Self::Left,
            Key::RightArrow => return Self::Right,
            _ => {}
        }

        if let Some(name) = name {
            if name.chars().any(char::is_control) {
                return Self::Other;
            }
            if let Some(ch) = single_printable_char(name) {
                return Self::Char(ch);
            }
        }

        match key {
            Key::Num0 | Key::Kp0 => Self::Char('0'),
            Key::Num1 | Key::Kp1 => Self::Char('1'),
            Key::Num2 | Key::Kp2 => Self::Char('2'),
            Key::Num3 | Key::Kp3 => Self::Char('3'),
            Key::Num4 | Key::Kp4 => Self::Char('4'),
            Key::Num5 | Key::Kp5 => Self::Char('5'),
            Key::Num6 | Key::Kp6 => Self::Char('6'),
            Key::Num7 | Key::Kp7 => Self::Char('7'),
            Key::Num8 | Key::Kp8 => Self::Char('8'),
            Key::Num9 | Key::Kp9 => Self::Char('9'),
            Key::KeyP => Self::Char('p'),
            Key::KeyQ => Self::Char('q'),
            Key::KeyT => Self::Char('t'),
            _ => Self::Other,
        }
    }
}

fn single_printable_char(name: &str) -> Option<char> {
    let mut chars = name.chars();
    let ch = chars.next()?;
    if chars.next().is_some() || ch.is_control() {
        return None;
    }
    Some(ch)
}

pub fn map_key_to_command(classes: &ClassMap, key: KeyInput) -> Option<SessionCommand> {
    match key {
        KeyInput::Up => Some(SessionCommand::ResizeBox(BoxAdjust::Taller)),
        KeyInput::Down => Some(SessionCommand::ResizeBox(BoxAdjust::Shorter)),
        KeyInput::Right => Some(SessionCommand::ResizeBox(BoxAdjust::Wider)),
        KeyInput::Left => Some(SessionCommand::ResizeBox(BoxAdjust::Narrower)),
        KeyInput::Char(ch) if classes.contains(ch) => Some(SessionCommand::SelectClass(ch)),
        KeyInput::Char(TEST_MODE_KEY) => Some(SessionCommand::ToggleTestMode),
        KeyInput::Char(PAUSE_KEY) => Some(SessionCommand::TogglePause),
        KeyInput::Char(QUIT_KEY) => Some(SessionCommand::Quit),
        KeyInput::Char(_) | KeyInput::Other => None,
    }
}
