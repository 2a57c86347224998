//! Global key hook feeding the overlay.
//!
//! A dedicated thread listens to OS key events through `rdev` and forwards
//! every non-modifier key press as a [`KeyStroke`], tagged with the modifiers
//! held at that moment. Modifier presses and all releases only update the
//! modifier state. While capture is on, plain presses are also kept from the
//! focused application.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use mouseless_core::KeyStroke;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

mod rdev_impl;

/// Handle to control the key hook.
pub struct KeyHookHandle {
    event_rx: Receiver<KeyStroke>,
    stop_tx: Sender<()>,
    capture: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl KeyHookHandle {
    /// Wait up to `timeout` for the next stroke.
    ///
    /// `Err` only when the hook thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<KeyStroke>, RecvTimeoutError> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(stroke) => Ok(Some(stroke)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Swallow plain key presses instead of passing them to the focused
    /// application. Has no effect when the hook could only listen.
    pub fn set_capture(&self, capture: bool) {
        self.capture.store(capture, Ordering::Relaxed);
    }

    /// Signal the hook to stop forwarding.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for KeyHookHandle {
    fn drop(&mut self) {
        self.stop();
        // Don't join: the rdev hook blocks for the life of the process.
        let _ = self.thread.take();
    }
}

/// Start listening for global key presses.
pub fn start_key_hook() -> KeyHookHandle {
    let (event_tx, event_rx) = bounded(256);
    let (stop_tx, stop_rx) = bounded(1);

    let capture = Arc::new(AtomicBool::new(false));
    let hook_capture = Arc::clone(&capture);

    let thread = thread::spawn(move || {
        rdev_impl::start_hook(event_tx, stop_rx, hook_capture);
    });

    KeyHookHandle {
        event_rx,
        stop_tx,
        capture,
        thread: Some(thread),
    }
}
