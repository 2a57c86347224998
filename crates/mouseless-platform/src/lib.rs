//! mouseless-platform: platform-specific I/O boundary for mouseless.
//!
//! This crate provides:
//! - Pointer injection (move, click, press/release) via `enigo`
//! - Primary screen size via `enigo`
//! - A global key hook via `rdev`, translated into core `KeyStroke`s
//!
//! ## Module Structure
//!
//! - `error` - Common error types
//! - `injector` - Pointer injection and screen size
//! - `key_hook` - Global key listening

mod error;
mod injector;
mod key_hook;

// Re-export error types
pub use error::{PlatformError, PlatformResult};

// Re-export pointer injection
pub use injector::{EnigoInjector, FixedScreen, InputInjector, NoopInjector, ScreenProvider};

// Re-export key hook
pub use key_hook::{start_key_hook, KeyHookHandle};
