//! Selection session: the key-by-key state machine.
//!
//! A gesture is row letter, column letter, inner key. Before the first letter
//! a digit may pick the action kind. Digit `4` arms hold mode: the gesture
//! that follows it only latches `holding`, and the next full gesture becomes
//! a drag to its resolved point instead of a click.
//!
//! The session performs no I/O. Every call returns the [`Signal`]s the host
//! has to act on, in order.

use crate::address::{letter_to_index, resolve_point, OuterAddress, ResolvedPoint, ScreenRect};
use crate::input::KeyInput;
use crate::layout::KeyboardLayout;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What happens at the resolved point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionKind {
    #[default]
    Click,
    RightClick,
    DoubleClick,
    TripleClick,
    /// Press-and-hold: the next gesture drags.
    Hold,
}

impl ActionKind {
    /// Action selected by a modifier digit `0`..=`4`.
    pub fn from_digit(digit: char) -> Option<Self> {
        match digit {
            '0' => Some(ActionKind::Click),
            '1' => Some(ActionKind::RightClick),
            '2' => Some(ActionKind::DoubleClick),
            '3' => Some(ActionKind::TripleClick),
            '4' => Some(ActionKind::Hold),
            _ => None,
        }
    }

    /// Text flashed on screen when the action is selected.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Click => "Click",
            ActionKind::RightClick => "Right click",
            ActionKind::DoubleClick => "Double click",
            ActionKind::TripleClick => "Triple click",
            ActionKind::Hold => "Hold",
        }
    }

    /// The discrete click to perform, `None` for [`ActionKind::Hold`].
    pub fn click_kind(&self) -> Option<ClickKind> {
        match self {
            ActionKind::Click => Some(ClickKind::Left),
            ActionKind::RightClick => Some(ClickKind::Right),
            ActionKind::DoubleClick => Some(ClickKind::Double),
            ActionKind::TripleClick => Some(ClickKind::Triple),
            ActionKind::Hold => None,
        }
    }
}

/// Discrete clicks the executor knows how to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    Left,
    Right,
    Double,
    Triple,
}

/// Output of the session, consumed by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    /// Flash the name of the selected action.
    ShowActionLabel(String),
    MoveCursor(ResolvedPoint),
    PerformClick(ClickKind),
    /// Press the left button at the current pointer position and move to the point.
    BeginDrag(ResolvedPoint),
    /// Release the button pressed by `BeginDrag`.
    EndDrag,
    CloseOverlay,
    /// Selection changed, redraw.
    Repaint,
}

/// Progress of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    RowChosen,
    CellChosen,
}

/// Mutable record of the current gesture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub row: Option<usize>,
    pub outer: Option<OuterAddress>,
    pub action: ActionKind,
    /// Hold armed, survives resets until a drag completes or is cancelled.
    pub holding: bool,
    /// A drag has begun and waits for [`SelectionSession::finish_drag`].
    pub dragging: bool,
}

impl SelectionState {
    pub fn phase(&self) -> Phase {
        if self.outer.is_some() {
            Phase::CellChosen
        } else if self.row.is_some() {
            Phase::RowChosen
        } else {
            Phase::Idle
        }
    }
}

/// Key-driven selection over one screen with one layout.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    layout: KeyboardLayout,
    screen: ScreenRect,
    state: SelectionState,
}

impl SelectionSession {
    pub fn new(layout: KeyboardLayout, screen: ScreenRect) -> Self {
        Self {
            layout,
            screen,
            state: SelectionState::default(),
        }
    }

    pub fn layout(&self) -> &KeyboardLayout {
        &self.layout
    }

    pub fn screen(&self) -> &ScreenRect {
        &self.screen
    }

    /// Replace the screen bound, e.g. after a resize between gestures.
    pub fn set_screen(&mut self, screen: ScreenRect) {
        debug!(?screen, "screen updated");
        self.screen = screen;
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_holding(&self) -> bool {
        self.state.holding
    }

    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Drop the current gesture. An armed hold stays armed.
    pub fn reset(&mut self) {
        self.state = SelectionState {
            holding: self.state.holding,
            dragging: self.state.dragging,
            ..SelectionState::default()
        };
    }

    /// Feed one key press.
    pub fn handle_key(&mut self, key: KeyInput) -> Vec<Signal> {
        if self.state.dragging {
            debug!(?key, "drag in progress, key ignored");
            return Vec::new();
        }

        match key {
            KeyInput::Escape => self.cancel(),
            KeyInput::Space => self.select_inner(self.layout.home_key()),
            KeyInput::Char(c) => match self.phase() {
                Phase::Idle => match ActionKind::from_digit(c) {
                    Some(action) => self.set_action(action),
                    None => self.choose_row(c),
                },
                Phase::RowChosen => self.choose_col(c),
                Phase::CellChosen => self.select_inner(c),
            },
            KeyInput::Function(_) | KeyInput::Other => {
                debug!(?key, "key ignored");
                Vec::new()
            }
        }
    }

    /// Complete a drag started by [`Signal::BeginDrag`]. Called by the host
    /// once the pointer has reached the target.
    pub fn finish_drag(&mut self) -> Vec<Signal> {
        if !self.state.dragging {
            return Vec::new();
        }
        self.state = SelectionState::default();
        info!("drag finished");
        vec![Signal::EndDrag, Signal::CloseOverlay]
    }

    fn cancel(&mut self) -> Vec<Signal> {
        match (self.phase(), self.state.holding) {
            (Phase::Idle, false) => {
                self.reset();
                vec![Signal::CloseOverlay]
            }
            (Phase::Idle, true) => {
                self.state.holding = false;
                self.reset();
                info!("hold disarmed");
                vec![Signal::Repaint]
            }
            _ => {
                self.reset();
                vec![Signal::Repaint]
            }
        }
    }

    fn set_action(&mut self, action: ActionKind) -> Vec<Signal> {
        if self.state.holding {
            debug!(?action, "action change ignored while holding");
            return Vec::new();
        }
        self.state.action = action;
        debug!(?action, "action selected");
        vec![Signal::ShowActionLabel(action.label().to_string())]
    }

    fn choose_row(&mut self, letter: char) -> Vec<Signal> {
        match letter_to_index(letter) {
            Ok(row) => {
                self.state.row = Some(row);
                debug!(row, "row chosen");
                vec![Signal::Repaint]
            }
            Err(e) => {
                debug!(error = %e, "row key ignored");
                Vec::new()
            }
        }
    }

    fn choose_col(&mut self, letter: char) -> Vec<Signal> {
        let Some(row) = self.state.row else {
            return Vec::new();
        };
        let outer = letter_to_index(letter).map(|col| OuterAddress::new(row, col));
        match outer {
            Ok(Some(outer)) => {
                self.state.outer = Some(outer);
                debug!(?outer, "cell chosen");
                vec![Signal::Repaint]
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                debug!(error = %e, "column key ignored");
                Vec::new()
            }
        }
    }

    fn select_inner(&mut self, key: char) -> Vec<Signal> {
        let Some(outer) = self.state.outer else {
            debug!(key = %key, "inner key before cell chosen, ignored");
            return Vec::new();
        };
        let point = match resolve_point(outer, key, &self.layout, &self.screen) {
            Ok(point) => point,
            Err(e) => {
                debug!(error = %e, "inner key ignored");
                return Vec::new();
            }
        };
        if self.state.holding {
            self.reset();
            self.state.dragging = true;
            info!(x = point.x, y = point.y, "drag started");
            return vec![Signal::BeginDrag(point)];
        }

        match self.state.action.click_kind() {
            None => {
                self.reset();
                self.state.holding = true;
                info!("hold armed");
                vec![Signal::Repaint]
            }
            Some(kind) => {
                self.reset();
                info!(x = point.x, y = point.y, ?kind, "point resolved");
                vec![
                    Signal::MoveCursor(point),
                    Signal::PerformClick(kind),
                    Signal::CloseOverlay,
                ]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::GRID_SIZE;

    fn session() -> SelectionSession {
        SelectionSession::new(KeyboardLayout::english(), ScreenRect::new(2600.0, 2600.0))
    }

    fn feed(session: &mut SelectionSession, keys: &str) -> Vec<Signal> {
        keys.chars()
            .flat_map(|c| {
                let key = match c {
                    ' ' => KeyInput::Space,
                    c => KeyInput::Char(c),
                };
                session.handle_key(key)
            })
            .collect()
    }

    fn expected_point(s: &SelectionSession, row: usize, col: usize, key: char) -> ResolvedPoint {
        let outer = OuterAddress::new(row, col).unwrap();
        resolve_point(outer, key, s.layout(), s.screen()).unwrap()
    }

    #[test]
    fn test_letters_build_address() {
        let mut s = session();
        assert_eq!(s.phase(), Phase::Idle);

        assert_eq!(s.handle_key(KeyInput::Char('c')), vec![Signal::Repaint]);
        assert_eq!(s.phase(), Phase::RowChosen);

        assert_eq!(s.handle_key(KeyInput::Char('H')), vec![Signal::Repaint]);
        assert_eq!(s.phase(), Phase::CellChosen);
        assert_eq!(s.state().outer, OuterAddress::new(2, 7));
    }

    #[test]
    fn test_every_letter_pair() {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let mut s = session();
                s.handle_key(KeyInput::Char((b'a' + row as u8) as char));
                s.handle_key(KeyInput::Char((b'a' + col as u8) as char));
                assert_eq!(s.state().outer, OuterAddress::new(row, col));
            }
        }
    }

    #[test]
    fn test_click_gesture() {
        let mut s = session();
        let signals = feed(&mut s, "aaq");

        assert_eq!(
            signals,
            vec![
                Signal::Repaint,
                Signal::Repaint,
                Signal::MoveCursor(ResolvedPoint {
                    x: 6.25,
                    y: 100.0 / 3.0 / 2.0
                }),
                Signal::PerformClick(ClickKind::Left),
                Signal::CloseOverlay,
            ]
        );
        assert_eq!(s.state(), &SelectionState::default());
    }

    #[test]
    fn test_digits_select_action() {
        let cases = [
            ('0', ClickKind::Left),
            ('1', ClickKind::Right),
            ('2', ClickKind::Double),
            ('3', ClickKind::Triple),
        ];
        for (digit, kind) in cases {
            let mut s = session();
            let label = ActionKind::from_digit(digit).unwrap().label().to_string();
            assert_eq!(
                s.handle_key(KeyInput::Char(digit)),
                vec![Signal::ShowActionLabel(label)]
            );
            assert_eq!(s.phase(), Phase::Idle);

            let signals = feed(&mut s, "bcd");
            assert!(signals.contains(&Signal::PerformClick(kind)));
            // action returns to the default after the gesture
            assert_eq!(s.state().action, ActionKind::Click);
        }
    }

    #[test]
    fn test_digit_ignored_after_letter() {
        let mut s = session();
        feed(&mut s, "b");
        assert!(s.handle_key(KeyInput::Char('1')).is_empty());
        assert_eq!(s.state().action, ActionKind::Click);
        assert_eq!(s.phase(), Phase::RowChosen);
    }

    #[test]
    fn test_digit_ignored_while_holding() {
        let mut s = session();
        feed(&mut s, "4aaf");
        assert!(s.is_holding());

        assert!(s.handle_key(KeyInput::Char('1')).is_empty());
        assert_eq!(s.state().action, ActionKind::Click);
    }

    #[test]
    fn test_escape_from_idle_closes() {
        let mut s = session();
        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::CloseOverlay]);
    }

    #[test]
    fn test_escape_mid_gesture_resets() {
        let mut s = session();
        feed(&mut s, "2ab");
        assert_eq!(s.phase(), Phase::CellChosen);

        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::Repaint]);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.state().action, ActionKind::Click);

        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::CloseOverlay]);
    }

    #[test]
    fn test_escape_keeps_hold_mid_gesture() {
        let mut s = session();
        feed(&mut s, "4aaf");
        feed(&mut s, "x");

        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::Repaint]);
        assert!(s.is_holding());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn test_escape_disarms_hold_from_idle() {
        let mut s = session();
        feed(&mut s, "4aaf");
        assert!(s.is_holding());

        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::Repaint]);
        assert!(!s.is_holding());
        assert_eq!(s.handle_key(KeyInput::Escape), vec![Signal::CloseOverlay]);
    }

    #[test]
    fn test_hold_and_drag() {
        let mut s = session();

        assert_eq!(
            s.handle_key(KeyInput::Char('4')),
            vec![Signal::ShowActionLabel("Hold".into())]
        );
        let arming = feed(&mut s, "aaf");
        assert_eq!(arming, vec![Signal::Repaint, Signal::Repaint, Signal::Repaint]);
        assert!(s.is_holding());
        assert_eq!(s.phase(), Phase::Idle);
        assert!(!arming
            .iter()
            .any(|sig| matches!(sig, Signal::MoveCursor(_) | Signal::PerformClick(_))));

        let drag = feed(&mut s, "zzq");
        let target = expected_point(&s, 25, 25, 'q');
        assert_eq!(
            drag,
            vec![Signal::Repaint, Signal::Repaint, Signal::BeginDrag(target)]
        );
        assert!(s.is_dragging());
        assert!(s.is_holding());

        // nothing gets through until the host releases
        assert!(s.handle_key(KeyInput::Escape).is_empty());
        assert!(feed(&mut s, "ab").is_empty());

        assert_eq!(s.finish_drag(), vec![Signal::EndDrag, Signal::CloseOverlay]);
        assert!(!s.is_holding());
        assert!(!s.is_dragging());
        assert_eq!(s.state(), &SelectionState::default());
    }

    #[test]
    fn test_finish_drag_without_drag() {
        let mut s = session();
        assert!(s.finish_drag().is_empty());
    }

    #[test]
    fn test_space_is_home_key() {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let r = (b'a' + row as u8) as char;
                let c = (b'a' + col as u8) as char;

                let mut by_space = session();
                by_space.handle_key(KeyInput::Char(r));
                by_space.handle_key(KeyInput::Char(c));
                let a = by_space.handle_key(KeyInput::Space);

                let mut by_home = session();
                by_home.handle_key(KeyInput::Char(r));
                by_home.handle_key(KeyInput::Char(c));
                let b = by_home.handle_key(KeyInput::Char('f'));

                assert_eq!(a, b);
                assert_eq!(a[0], Signal::MoveCursor(expected_point(&by_home, row, col, 'f')));
            }
        }
    }

    #[test]
    fn test_space_ignored_before_cell() {
        let mut s = session();
        assert!(s.handle_key(KeyInput::Space).is_empty());
        feed(&mut s, "a");
        assert!(s.handle_key(KeyInput::Space).is_empty());
        assert_eq!(s.phase(), Phase::RowChosen);
    }

    #[test]
    fn test_unknown_inner_key_ignored() {
        let mut s = session();
        feed(&mut s, "mm");
        let before = s.state().clone();

        assert!(s.handle_key(KeyInput::Char('g')).is_empty());
        assert!(s.handle_key(KeyInput::Char('7')).is_empty());
        assert!(s.handle_key(KeyInput::Other).is_empty());
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_non_letters_ignored_for_address() {
        let mut s = session();
        assert!(s.handle_key(KeyInput::Char(';')).is_empty());
        assert!(s.handle_key(KeyInput::Char('9')).is_empty());
        assert!(s.handle_key(KeyInput::Function(3)).is_empty());
        assert_eq!(s.phase(), Phase::Idle);

        feed(&mut s, "a");
        assert!(s.handle_key(KeyInput::Char(',')).is_empty());
        assert_eq!(s.phase(), Phase::RowChosen);
    }

    #[test]
    fn test_punctuation_inner_key() {
        let mut s = SelectionSession::new(
            KeyboardLayout::brazilian(),
            ScreenRect::new(1920.0, 1080.0),
        );
        feed(&mut s, "ab");
        let signals = s.handle_key(KeyInput::Char('Ç'));
        assert_eq!(signals[0], Signal::MoveCursor(expected_point(&s, 0, 1, 'ç')));
    }

    #[test]
    fn test_set_screen_between_gestures() {
        let mut s = session();
        s.set_screen(ScreenRect::new(260.0, 260.0));
        let signals = feed(&mut s, "aaq");
        assert_eq!(
            signals[2],
            Signal::MoveCursor(ResolvedPoint {
                x: 10.0 / 8.0 / 2.0,
                y: 10.0 / 3.0 / 2.0
            })
        );
    }

    #[test]
    fn test_public_reset_keeps_hold() {
        let mut s = session();
        feed(&mut s, "4aaf");
        feed(&mut s, "bc");
        s.reset();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.is_holding());
    }
}
