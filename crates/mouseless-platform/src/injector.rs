//! Pointer injection implementations.

use crate::{PlatformError, PlatformResult};
use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use mouseless_core::{ClickKind, PointerAction, ScreenRect};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Trait for injecting pointer actions into the OS.
pub trait InputInjector: Send + Sync {
    fn inject(&self, action: &PointerAction) -> PlatformResult<()>;
}

/// Source of the addressable screen size.
pub trait ScreenProvider {
    fn screen_rect(&self) -> PlatformResult<ScreenRect>;
}

impl<T: InputInjector + ?Sized> InputInjector for Arc<T> {
    fn inject(&self, action: &PointerAction) -> PlatformResult<()> {
        (**self).inject(action)
    }
}

impl<T: ScreenProvider + ?Sized> ScreenProvider for Arc<T> {
    fn screen_rect(&self) -> PlatformResult<ScreenRect> {
        (**self).screen_rect()
    }
}

/// Minimal no-op injector for dry runs and testing.
pub struct NoopInjector;

impl InputInjector for NoopInjector {
    fn inject(&self, action: &PointerAction) -> PlatformResult<()> {
        debug!(?action, "NoopInjector: would inject action");
        Ok(())
    }
}

/// A screen of known size.
#[derive(Debug, Clone, Copy)]
pub struct FixedScreen(pub ScreenRect);

impl ScreenProvider for FixedScreen {
    fn screen_rect(&self) -> PlatformResult<ScreenRect> {
        Ok(self.0)
    }
}

/// Real pointer injector using the `enigo` crate.
pub struct EnigoInjector {
    enigo: Mutex<Enigo>,
}

impl EnigoInjector {
    /// Create a new EnigoInjector.
    pub fn new() -> PlatformResult<Self> {
        let settings = Settings::default();
        let enigo = Enigo::new(&settings).map_err(|e| {
            PlatformError::InjectionFailed(format!("failed to create Enigo: {e}"))
        })?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }

    fn lock(&self) -> PlatformResult<MutexGuard<'_, Enigo>> {
        self.enigo
            .lock()
            .map_err(|_| PlatformError::InjectionFailed("enigo lock poisoned".into()))
    }
}

impl InputInjector for EnigoInjector {
    fn inject(&self, action: &PointerAction) -> PlatformResult<()> {
        let mut enigo = self.lock()?;

        match action {
            PointerAction::MoveTo { x, y } => {
                debug!(x, y, "injecting pointer move");
                enigo
                    .move_mouse(*x, *y, Coordinate::Abs)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
            }

            PointerAction::Click(kind) => {
                debug!(?kind, "injecting click");
                let (button, count) = click_plan(*kind);
                for _ in 0..count {
                    enigo
                        .button(button, Direction::Click)
                        .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
                }
            }

            PointerAction::Press => {
                debug!("injecting button press");
                enigo
                    .button(Button::Left, Direction::Press)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
            }

            PointerAction::Release => {
                debug!("injecting button release");
                enigo
                    .button(Button::Left, Direction::Release)
                    .map_err(|e| PlatformError::InjectionFailed(e.to_string()))?;
            }
        }

        Ok(())
    }
}

impl ScreenProvider for EnigoInjector {
    fn screen_rect(&self) -> PlatformResult<ScreenRect> {
        let enigo = self.lock()?;
        let (width, height) = enigo
            .main_display()
            .map_err(|e| PlatformError::ScreenUnavailable(e.to_string()))?;
        if width <= 0 || height <= 0 {
            return Err(PlatformError::ScreenUnavailable(format!(
                "main display reported {width}x{height}"
            )));
        }
        Ok(ScreenRect::new(width as f64, height as f64))
    }
}

/// Button and number of clicks for a click kind.
fn click_plan(kind: ClickKind) -> (Button, usize) {
    match kind {
        ClickKind::Left => (Button::Left, 1),
        ClickKind::Right => (Button::Right, 1),
        ClickKind::Double => (Button::Left, 2),
        ClickKind::Triple => (Button::Left, 3),
    }
}
