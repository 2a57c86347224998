//! rdev-based key hook and key translation.

use crate::PlatformError;
use crossbeam_channel::{Receiver, Sender};
use mouseless_core::{KeyInput, KeyStroke, Modifiers};
#[cfg(feature = "unstable_grab")]
use rdev::grab;
use rdev::{listen, Event, EventType, Key};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Tracks which modifier keys are currently held.
#[derive(Debug, Default, Clone)]
pub struct ModifierTracker {
    ctrl: [bool; 2],
    alt: [bool; 2],
    shift: [bool; 2],
    meta: [bool; 2],
}

impl ModifierTracker {
    /// Record a press or release. Returns `false` for non-modifier keys.
    pub fn update(&mut self, key: Key, pressed: bool) -> bool {
        let slot = match key {
            Key::ControlLeft => &mut self.ctrl[0],
            Key::ControlRight => &mut self.ctrl[1],
            Key::Alt => &mut self.alt[0],
            Key::AltGr => &mut self.alt[1],
            Key::ShiftLeft => &mut self.shift[0],
            Key::ShiftRight => &mut self.shift[1],
            Key::MetaLeft => &mut self.meta[0],
            Key::MetaRight => &mut self.meta[1],
            _ => return false,
        };
        *slot = pressed;
        true
    }

    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl.iter().any(|&b| b),
            alt: self.alt.iter().any(|&b| b),
            shift: self.shift.iter().any(|&b| b),
            meta: self.meta.iter().any(|&b| b),
        }
    }
}

/// Translate an rdev key into a symbolic key.
///
/// `name` is the text the OS produced for the press, if any. It is preferred
/// so non-US layouts (e.g. `ç`) come through as typed; control characters
/// produced while ctrl is held fall back to the physical key.
pub fn key_input(key: Key, name: Option<&str>) -> KeyInput {
    match key {
        Key::Escape => return KeyInput::Escape,
        Key::Space => return KeyInput::Space,
        _ => {}
    }
    if let Some(n) = function_number(key) {
        return KeyInput::Function(n);
    }

    if let Some(text) = name {
        let mut chars = text.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_control() && !c.is_whitespace() {
                return KeyInput::Char(c);
            }
        }
    }

    physical_char(key).map_or(KeyInput::Other, KeyInput::Char)
}

fn function_number(key: Key) -> Option<u8> {
    let n = match key {
        Key::F1 => 1,
        Key::F2 => 2,
        Key::F3 => 3,
        Key::F4 => 4,
        Key::F5 => 5,
        Key::F6 => 6,
        Key::F7 => 7,
        Key::F8 => 8,
        Key::F9 => 9,
        Key::F10 => 10,
        Key::F11 => 11,
        Key::F12 => 12,
        _ => return None,
    };
    Some(n)
}

/// Character printed on a US keyboard for a physical key.
fn physical_char(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 | Key::Kp0 => '0',
        Key::Num1 | Key::Kp1 => '1',
        Key::Num2 | Key::Kp2 => '2',
        Key::Num3 | Key::Kp3 => '3',
        Key::Num4 | Key::Kp4 => '4',
        Key::Num5 | Key::Kp5 => '5',
        Key::Num6 | Key::Kp6 => '6',
        Key::Num7 | Key::Kp7 => '7',
        Key::Num8 | Key::Kp8 => '8',
        Key::Num9 | Key::Kp9 => '9',
        Key::SemiColon => ';',
        Key::Comma => ',',
        Key::Dot => '.',
        Key::Slash => '/',
        Key::Quote => '\'',
        Key::BackQuote => '`',
        Key::Minus => '-',
        Key::Equal => '=',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::BackSlash | Key::IntlBackslash => '\\',
        _ => return None,
    };
    Some(c)
}

/// Key at the same position on a US keyboard, ignoring the active layout.
pub fn physical_input(key: Key) -> KeyInput {
    match key {
        Key::Escape => KeyInput::Escape,
        Key::Space => KeyInput::Space,
        _ => function_number(key)
            .map(KeyInput::Function)
            .or_else(|| physical_char(key).map(KeyInput::Char))
            .unwrap_or(KeyInput::Other),
    }
}

/// Outcome of one OS key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookDecision {
    /// Stroke to forward to the app, if the event is a non-modifier press.
    pub stroke: Option<KeyStroke>,
    /// Keep the event from reaching the focused application.
    pub swallow: bool,
}

impl HookDecision {
    const PASS: HookDecision = HookDecision {
        stroke: None,
        swallow: false,
    };
}

/// Turns raw key events into strokes and decides which ones to swallow.
///
/// While capturing, plain and shifted presses are swallowed, and so is the
/// matching release even if capture ended in between. Modifier keys and
/// presses with ctrl, alt or meta held always reach the OS.
#[derive(Debug, Default)]
pub struct KeyFilter {
    tracker: ModifierTracker,
    swallowed: Vec<Key>,
}

impl KeyFilter {
    pub fn handle(
        &mut self,
        event_type: EventType,
        name: Option<&str>,
        capturing: bool,
    ) -> HookDecision {
        match event_type {
            EventType::KeyPress(key) => {
                if self.tracker.update(key, true) {
                    return HookDecision::PASS;
                }
                let modifiers = self.tracker.modifiers();
                let stroke = KeyStroke::new(key_input(key, name), modifiers)
                    .with_physical(physical_input(key));
                let swallow = capturing && !modifiers.has_command();
                if swallow && !self.swallowed.contains(&key) {
                    self.swallowed.push(key);
                }
                HookDecision {
                    stroke: Some(stroke),
                    swallow,
                }
            }
            EventType::KeyRelease(key) => {
                self.tracker.update(key, false);
                let before = self.swallowed.len();
                self.swallowed.retain(|k| *k != key);
                HookDecision {
                    stroke: None,
                    swallow: self.swallowed.len() != before,
                }
            }
            _ => HookDecision::PASS,
        }
    }
}

/// State shared by the grab callback and the listen fallback.
struct HookState {
    filter: KeyFilter,
    event_tx: Sender<KeyStroke>,
    stop_rx: Receiver<()>,
    capture: Arc<AtomicBool>,
    stopped: bool,
}

impl HookState {
    /// Forward the event's stroke; returns whether to swallow it.
    fn process(&mut self, event: &Event) -> bool {
        if self.stopped {
            return false;
        }
        if self.stop_rx.try_recv().is_ok() {
            debug!("Key hook received stop signal");
            self.stopped = true;
            return false;
        }

        let capturing = self.capture.load(Ordering::Relaxed);
        let decision = self
            .filter
            .handle(event.event_type, event.name.as_deref(), capturing);
        if let Some(stroke) = decision.stroke {
            if let Err(e) = self.event_tx.try_send(stroke) {
                warn!("Failed to send key stroke: {}", e);
            }
        }
        decision.swallow
    }
}

/// Run the rdev hook until the process exits.
///
/// With the `unstable_grab` feature keys are grabbed so captured strokes can
/// be swallowed; if grabbing fails the hook falls back to listening only.
pub fn start_hook(
    event_tx: Sender<KeyStroke>,
    stop_rx: Receiver<()>,
    capture: Arc<AtomicBool>,
) {
    info!("Key hook thread started (rdev)");
    let state = Rc::new(RefCell::new(HookState {
        filter: KeyFilter::default(),
        event_tx,
        stop_rx,
        capture,
        stopped: false,
    }));

    #[cfg(feature = "unstable_grab")]
    {
        let grab_state = Rc::clone(&state);
        let callback = move |event: Event| -> Option<Event> {
            if grab_state.borrow_mut().process(&event) {
                None
            } else {
                Some(event)
            }
        };
        match grab(callback) {
            Ok(()) => {
                info!("Key hook thread exiting");
                return;
            }
            Err(e) => {
                warn!(error = ?e, "Failed to grab keys, falling back to listening");
            }
        }
    }

    let callback = move |event: Event| {
        state.borrow_mut().process(&event);
    };
    if let Err(e) = listen(callback) {
        let err = PlatformError::HookFailed(format!("{e:?}"));
        error!(error = %err, "Key hook error");
    }

    info!("Key hook thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_input_special_keys() {
        assert_eq!(key_input(Key::Escape, None), KeyInput::Escape);
        assert_eq!(key_input(Key::Space, Some(" ")), KeyInput::Space);
        assert_eq!(key_input(Key::F7, None), KeyInput::Function(7));
        assert_eq!(key_input(Key::Home, None), KeyInput::Other);
    }

    #[test]
    fn test_key_input_prefers_typed_text() {
        assert_eq!(key_input(Key::SemiColon, Some("ç")), KeyInput::Char('ç'));
        assert_eq!(key_input(Key::KeyA, Some("A")), KeyInput::Char('A'));
    }

    #[test]
    fn test_key_input_physical_fallback() {
        // ctrl+g produces BEL as text
        assert_eq!(key_input(Key::KeyG, Some("\u{7}")), KeyInput::Char('g'));
        assert_eq!(key_input(Key::Num4, None), KeyInput::Char('4'));
        assert_eq!(key_input(Key::Comma, Some("")), KeyInput::Char(','));
    }

    fn ctrl_alt() -> Modifiers {
        Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::NONE
        }
    }

    #[test]
    fn test_physical_input() {
        assert_eq!(physical_input(Key::KeyQ), KeyInput::Char('q'));
        assert_eq!(physical_input(Key::SemiColon), KeyInput::Char(';'));
        assert_eq!(physical_input(Key::F4), KeyInput::Function(4));
        assert_eq!(physical_input(Key::Escape), KeyInput::Escape);
        assert_eq!(physical_input(Key::Home), KeyInput::Other);
    }

    #[test]
    fn test_altgr_stroke_keeps_physical_key() {
        let mut filter = KeyFilter::default();
        filter.handle(EventType::KeyPress(Key::ControlLeft), None, false);
        filter.handle(EventType::KeyPress(Key::Alt), None, false);

        // ABNT2 reports ctrl+alt+q as '/'
        let decision = filter.handle(EventType::KeyPress(Key::KeyQ), Some("/"), false);
        let stroke = decision.stroke.unwrap();
        assert_eq!(stroke.input, KeyInput::Char('/'));
        assert_eq!(stroke.physical, KeyInput::Char('q'));
        assert_eq!(stroke.modifiers, ctrl_alt());

        let quit: mouseless_core::Hotkey = "ctrl+alt+q".parse().unwrap();
        assert!(quit.matches(&stroke));
    }

    #[test]
    fn test_filter_swallows_while_capturing() {
        let mut filter = KeyFilter::default();

        let press = filter.handle(EventType::KeyPress(Key::KeyA), Some("a"), true);
        assert!(press.swallow);
        assert_eq!(press.stroke.unwrap().input, KeyInput::Char('a'));

        // capture ended before the release, the release still goes with its press
        let release = filter.handle(EventType::KeyRelease(Key::KeyA), None, false);
        assert!(release.swallow);
        assert!(release.stroke.is_none());

        let press = filter.handle(EventType::KeyPress(Key::KeyA), Some("a"), false);
        assert!(!press.swallow);
        assert!(press.stroke.is_some());
        let release = filter.handle(EventType::KeyRelease(Key::KeyA), None, false);
        assert!(!release.swallow);
    }

    #[test]
    fn test_filter_passes_modifiers_and_commands() {
        let mut filter = KeyFilter::default();

        let ctrl = filter.handle(EventType::KeyPress(Key::ControlLeft), None, true);
        assert_eq!(ctrl, HookDecision::PASS);

        let copy = filter.handle(EventType::KeyPress(Key::KeyC), Some("\u{3}"), true);
        assert!(!copy.swallow);
        assert_eq!(copy.stroke.unwrap().input, KeyInput::Char('c'));
        let release = filter.handle(EventType::KeyRelease(Key::KeyC), None, true);
        assert!(!release.swallow);
        let release = filter.handle(EventType::KeyRelease(Key::ControlLeft), None, true);
        assert!(!release.swallow);

        filter.handle(EventType::KeyPress(Key::ShiftLeft), None, true);
        let shifted = filter.handle(EventType::KeyPress(Key::Slash), Some("?"), true);
        assert!(shifted.swallow);
        assert_eq!(shifted.stroke.unwrap().input, KeyInput::Char('?'));
    }

    #[test]
    fn test_modifier_tracker() {
        let mut tracker = ModifierTracker::default();
        assert_eq!(tracker.modifiers(), Modifiers::NONE);

        assert!(tracker.update(Key::ControlLeft, true));
        assert!(tracker.update(Key::Alt, true));
        assert!(!tracker.update(Key::KeyG, true));
        let held = tracker.modifiers();
        assert!(held.ctrl && held.alt && !held.shift && !held.meta);

        // both shift keys must be released
        tracker.update(Key::ShiftLeft, true);
        tracker.update(Key::ShiftRight, true);
        tracker.update(Key::ShiftLeft, false);
        assert!(tracker.modifiers().shift);
        tracker.update(Key::ShiftRight, false);
        assert!(!tracker.modifiers().shift);

        tracker.update(Key::ControlLeft, false);
        tracker.update(Key::Alt, false);
        assert_eq!(tracker.modifiers(), Modifiers::NONE);
    }
}
