//! Overlay controller.
//!
//! Owns the selection session and routes global key strokes to it. The
//! overlay stays hidden until the show hotkey is pressed; while visible every
//! stroke goes to the session and the resulting signals are carried out:
//! pointer work goes to the injector, the rest updates the overlay state.

use crate::state::OverlayState;
use mouseless_core::{
    Hotkey, KeyStroke, KeyboardLayout, OverlayView, ScreenRect, SelectionSession, Signal,
};
use mouseless_platform::{InputInjector, ScreenProvider};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Screen assumed when the display size can't be read.
pub const FALLBACK_SCREEN: ScreenRect = ScreenRect {
    width: 1920.0,
    height: 1080.0,
};

/// Whether the main loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct OverlayController<I, S> {
    session: SelectionSession,
    injector: I,
    screen: S,
    show_hotkey: Hotkey,
    quit_hotkey: Hotkey,
    state: OverlayState,
}

impl<I: InputInjector, S: ScreenProvider> OverlayController<I, S> {
    pub fn new(
        layout: KeyboardLayout,
        injector: I,
        screen: S,
        show_hotkey: Hotkey,
        quit_hotkey: Hotkey,
    ) -> Self {
        let rect = read_screen(&screen).unwrap_or(FALLBACK_SCREEN);
        Self {
            session: SelectionSession::new(layout, rect),
            injector,
            screen,
            show_hotkey,
            quit_hotkey,
            state: OverlayState::default(),
        }
    }

    pub fn session(&self) -> &SelectionSession {
        &self.session
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    /// Handle one key stroke from the hook.
    pub fn handle_stroke(&mut self, stroke: KeyStroke, now: Instant) -> Flow {
        if self.quit_hotkey.matches(&stroke) {
            info!("Quit hotkey pressed");
            return Flow::Quit;
        }

        if self.show_hotkey.matches(&stroke) {
            if !self.state.visible {
                self.show();
            }
            return Flow::Continue;
        }

        if !self.state.visible {
            return Flow::Continue;
        }

        // ctrl+c and friends are not overlay keys
        if stroke.modifiers.has_command() {
            debug!(?stroke, "command stroke ignored");
            return Flow::Continue;
        }

        let signals = self.session.handle_key(stroke.input);
        self.dispatch(signals, now);
        Flow::Continue
    }

    /// Periodic housekeeping between strokes.
    pub fn tick(&mut self, now: Instant) {
        self.state.expire_flash(now);
    }

    fn show(&mut self) {
        if let Some(rect) = read_screen(&self.screen) {
            self.session.set_screen(rect);
        }
        self.session.reset();
        self.state.show(OverlayView::from_session(&self.session));
        info!(holding = self.session.is_holding(), "Overlay shown");
    }

    fn hide(&mut self) {
        self.state.hide();
        info!("Overlay hidden");
    }

    fn dispatch(&mut self, signals: Vec<Signal>, now: Instant) {
        let mut queue: VecDeque<Signal> = signals.into();

        while let Some(signal) = queue.pop_front() {
            debug!(?signal, "dispatching signal");

            for action in signal.pointer_actions() {
                if let Err(e) = self.injector.inject(&action) {
                    error!(?action, error = %e, "pointer injection failed");
                }
            }

            match signal {
                Signal::ShowActionLabel(text) => self.state.flash(text, now),
                Signal::Repaint => {
                    self.state.view = Some(OverlayView::from_session(&self.session));
                }
                Signal::CloseOverlay => self.hide(),
                // the drag is injected synchronously, release right away
                Signal::BeginDrag(_) => queue.extend(self.session.finish_drag()),
                Signal::MoveCursor(_) | Signal::PerformClick(_) | Signal::EndDrag => {}
            }
        }
    }
}

fn read_screen<S: ScreenProvider>(screen: &S) -> Option<ScreenRect> {
    match screen.screen_rect() {
        Ok(rect) => Some(rect),
        Err(e) => {
            warn!(error = %e, "Failed to read screen size");
            None
        }
    }
}
