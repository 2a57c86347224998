//! Overlay presentation state owned by the shell.

use mouseless_core::{OverlayView, FLASH_DURATION};
use std::time::Instant;

/// Action name currently flashed on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub text: String,
    pub until: Instant,
}

/// What the overlay window is showing.
#[derive(Debug, Default)]
pub struct OverlayState {
    pub visible: bool,
    pub flash: Option<Flash>,
    /// Render model handed to whatever draws the overlay window; drawing
    /// itself happens outside this crate. Rebuilt on every repaint.
    pub view: Option<OverlayView>,
}

impl OverlayState {
    pub fn show(&mut self, view: OverlayView) {
        self.visible = true;
        self.view = Some(view);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.flash = None;
        self.view = None;
    }

    /// Show `text`, replacing any flash still on screen.
    pub fn flash(&mut self, text: String, now: Instant) {
        self.flash = Some(Flash {
            text,
            until: now + FLASH_DURATION,
        });
    }

    /// Drop the flash once its time is up.
    pub fn expire_flash(&mut self, now: Instant) {
        if self.flash.as_ref().is_some_and(|f| now >= f.until) {
            self.flash = None;
        }
    }
}
