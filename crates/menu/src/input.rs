//! Maps raw terminal input onto carousel commands.

use crate::config::MenuConfig;
use crate::{Error, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::fmt;
use std::str::FromStr;

/// A carousel navigation command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavCommand {
    Retreat,
    Advance,
}

/// A pointer event in terminal cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Moved { x: u16, y: u16 },
    /// A primary or secondary button press.
    Clicked { x: u16, y: u16 },
}

impl PointerEvent {
    /// Converts a crossterm mouse event. Releases, drags and scrolling are dropped.
    pub fn from_mouse(mouse: MouseEvent) -> Option<Self> {
        let (x, y) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => Some(Self::Moved { x, y }),
            MouseEventKind::Down(MouseButton::Left | MouseButton::Right) => Some(Self::Clicked { x, y }),
            _ => None,
        }
    }
}

/// One key chord such as `Left`, `A` or `Ctrl+A`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Keybind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Keybind {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Whether `key` is this chord. Shift is ignored for character keys, whose
    /// case already carries it.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let relevant = |m: KeyModifiers| match key.code {
            KeyCode::Char(_) => m.difference(KeyModifiers::SHIFT),
            _ => m,
        };
        normalize(key.code) == normalize(self.code) && relevant(key.modifiers) == relevant(self.modifiers)
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

impl FromStr for Keybind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidKeybind(s.to_string());
        let mut modifiers = KeyModifiers::NONE;
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().filter(|k| !k.is_empty()).ok_or_else(invalid)?;

        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(invalid()),
            };
        }

        let code = match key.to_ascii_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "enter" => KeyCode::Enter,
            "space" => KeyCode::Char(' '),
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            lower => {
                if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
                    && (1..=12).contains(&n)
                {
                    KeyCode::F(n)
                } else {
                    let mut chars = key.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => KeyCode::Char(c.to_ascii_lowercase()),
                        _ => return Err(invalid()),
                    }
                }
            }
        };
        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for Keybind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::SHIFT, "Shift"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Any of several chords.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeybindList(pub Vec<Keybind>);

impl KeybindList {
    /// Parses every entry, failing on the first invalid one.
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        entries
            .iter()
            .map(|e| e.as_ref().parse())
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.0.iter().any(|bind| bind.matches(key))
    }
}

/// The configured navigation keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bindings {
    pub retreat: KeybindList,
    pub advance: KeybindList,
}

impl Bindings {
    pub fn from_config(config: &MenuConfig) -> Result<Self> {
        Ok(Self {
            retreat: KeybindList::parse(&config.left_arrow)?,
            advance: KeybindList::parse(&config.right_arrow)?,
        })
    }

    /// Commands triggered by one key event. Only presses count; a key bound
    /// both ways yields both commands.
    pub fn commands_for_key(&self, key: &KeyEvent) -> Vec<NavCommand> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let mut commands = Vec::new();
        if self.retreat.matches(key) {
            commands.push(NavCommand::Retreat);
        }
        if self.advance.matches(key) {
            commands.push(NavCommand::Advance);
        }
        commands
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            retreat: KeybindList(vec![Keybind::new(KeyCode::Left, KeyModifiers::NONE)]),
            advance: KeybindList(vec![Keybind::new(KeyCode::Right, KeyModifiers::NONE)]),
        }
    }
}
