//! Symbolic key input and hotkey descriptions.
//!
//! Platform hooks translate their raw events into [`KeyStroke`]s before
//! anything reaches the session, so the core never sees OS key codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Logical identity of a pressed key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyInput {
    /// Cancel key.
    Escape,
    /// Space bar, stands in for the layout's home key.
    Space,
    /// Any key producing a single character (letters, digits, punctuation).
    Char(char),
    /// F1..F12. Only meaningful for hotkeys.
    Function(u8),
    Other,
}

/// Modifier keys held while a key was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    /// Ctrl, alt or meta held. Shift alone still types text.
    pub fn has_command(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// One key press together with the modifiers held at the time.
///
/// `input` is what the active keyboard layout typed; `physical` is the key
/// at that position on a US keyboard. They differ on non-US layouts and
/// whenever AltGr is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStroke {
    pub input: KeyInput,
    pub physical: KeyInput,
    pub modifiers: Modifiers,
}

impl KeyStroke {
    pub fn new(input: KeyInput, modifiers: Modifiers) -> Self {
        Self {
            input,
            physical: input,
            modifiers,
        }
    }

    pub fn plain(input: KeyInput) -> Self {
        Self::new(input, Modifiers::NONE)
    }

    pub fn with_physical(mut self, physical: KeyInput) -> Self {
        self.physical = physical;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("hotkey is empty")]
    Empty,
    #[error("hotkey {0:?} has no key besides modifiers")]
    MissingKey(String),
    #[error("hotkey {0:?} names more than one key")]
    MultipleKeys(String),
    #[error("unknown key {0:?} in hotkey")]
    UnknownKey(String),
}

/// A global shortcut such as `ctrl+alt+g`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: KeyInput,
}

impl Hotkey {
    /// Whether a stroke triggers this hotkey. The key may match either the
    /// typed or the physical key, so `ctrl+alt+q` still fires on layouts where
    /// AltGr turns `q` into another character. Letters compare
    /// case-insensitively since shift is already part of the modifier set.
    pub fn matches(&self, stroke: &KeyStroke) -> bool {
        self.modifiers == stroke.modifiers
            && (same_key(self.key, stroke.input) || same_key(self.key, stroke.physical))
    }
}

fn same_key(a: KeyInput, b: KeyInput) -> bool {
    match (a, b) {
        (KeyInput::Char(a), KeyInput::Char(b)) => a.eq_ignore_ascii_case(&b),
        (a, b) => a == b,
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        for token in s.split('+').map(str::trim) {
            let lower = token.to_lowercase();
            match lower.as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "super" | "win" | "cmd" | "command" => modifiers.meta = true,
                "" => {}
                _ => {
                    if key.is_some() {
                        return Err(HotkeyError::MultipleKeys(s.to_string()));
                    }
                    key = Some(parse_key_name(&lower)?);
                }
            }
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(s.to_string()))?;
        Ok(Self { modifiers, key })
    }
}

fn parse_key_name(name: &str) -> Result<KeyInput, HotkeyError> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyInput::Char(c));
    }

    match name {
        "space" => Ok(KeyInput::Space),
        "esc" | "escape" => Ok(KeyInput::Escape),
        _ => name
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyInput::Function)
            .ok_or_else(|| HotkeyError::UnknownKey(name.to_string())),
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.ctrl, "ctrl"),
            (m.alt, "alt"),
            (m.shift, "shift"),
            (m.meta, "meta"),
        ] {
            if held {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            KeyInput::Char(c) => write!(f, "{c}"),
            KeyInput::Space => write!(f, "space"),
            KeyInput::Escape => write!(f, "esc"),
            KeyInput::Function(n) => write!(f, "f{n}"),
            KeyInput::Other => write!(f, "?"),
        }
    }
}
