//! mouseless-core: grid addressing + selection session.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! Platform specific I/O (key hook, pointer injection) lives in
//! `mouseless-platform`; the overlay window and hotkeys live in the app.

mod address;
mod input;
mod layout;
mod overlay;
mod session;
mod settings;

pub use address::{
    cell_bounds, index_to_letter, letter_to_index, resolve_point, AddressError, OuterAddress,
    Rect, ResolvedPoint, ScreenRect, GRID_SIZE,
};
pub use input::{Hotkey, HotkeyError, KeyInput, KeyStroke, Modifiers};
pub use layout::{KeyboardLayout, Language, LayoutError, DEFAULT_HOME_KEY};
pub use overlay::{
    grid_lines, outer_labels, subgrid_labels, subgrid_lines, Label, Line, OverlayContent,
    OverlayView, FLASH_DURATION,
};
pub use session::{ActionKind, ClickKind, Phase, SelectionSession, SelectionState, Signal};
pub use settings::{
    get_config_dir, load_settings, load_settings_from, settings_path, Settings, SettingsError,
    SettingsResult, SETTINGS_FILE_NAME, SETTINGS_PATH_ENV,
};

use serde::{Deserialize, Serialize};

/// Pointer operation handed to an injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerAction {
    /// Warp the pointer to an absolute position.
    MoveTo { x: i32, y: i32 },
    /// Click at the current position.
    Click(ClickKind),
    /// Left button down (drag start).
    Press,
    /// Left button up (drag end).
    Release,
}

impl Signal {
    /// Pointer operations needed to carry out this signal. Empty for purely
    /// visual signals.
    pub fn pointer_actions(&self) -> Vec<PointerAction> {
        match self {
            Signal::MoveCursor(point) => {
                let (x, y) = point.to_pixel();
                vec![PointerAction::MoveTo { x, y }]
            }
            Signal::PerformClick(kind) => vec![PointerAction::Click(*kind)],
            Signal::BeginDrag(point) => {
                let (x, y) = point.to_pixel();
                vec![PointerAction::Press, PointerAction::MoveTo { x, y }]
            }
            Signal::EndDrag => vec![PointerAction::Release],
            Signal::ShowActionLabel(_) | Signal::CloseOverlay | Signal::Repaint => Vec::new(),
        }
    }
}
