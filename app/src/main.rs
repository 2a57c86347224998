#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod controller;
mod state;

use anyhow::{bail, Context, Result};
use clap::Parser;
use controller::{Flow, OverlayController};
use mouseless_core::{load_settings, load_settings_from, ScreenRect, Settings};
use mouseless_platform::{
    start_key_hook, EnigoInjector, FixedScreen, InputInjector, NoopInjector, ScreenProvider,
};
use single_instance::SingleInstance;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Parser, Debug)]
#[command(name = "mouseless", version, about = "Drive the mouse pointer from the keyboard")]
struct Cli {
    /// Log pointer actions instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Settings file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mouseless=info,mouseless_core=info,mouseless_platform=info".into()
            }),
        )
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let instance = SingleInstance::new("mouseless").context("failed to acquire instance lock")?;
    if !instance.is_single() {
        warn!("Another mouseless instance is already running");
        return Ok(());
    }

    let settings = match &cli.settings {
        Some(path) => load_settings_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => load_settings(),
    };
    info!(language = ?settings.language(), "Settings loaded");

    if cli.dry_run {
        info!("Dry run: pointer actions are only logged");
        let screen = FixedScreen(ScreenRect::new(1920.0, 1080.0));
        run(&settings, NoopInjector, screen)
    } else {
        let injector = Arc::new(EnigoInjector::new()?);
        run(&settings, injector.clone(), injector)
    }
}

fn run<I: InputInjector, S: ScreenProvider>(
    settings: &Settings,
    injector: I,
    screen: S,
) -> Result<()> {
    let show_hotkey = settings.show_hotkey()?;
    let quit_hotkey = settings.quit_hotkey()?;
    let mut controller = OverlayController::new(
        settings.keyboard_layout(),
        injector,
        screen,
        show_hotkey,
        quit_hotkey,
    );

    let hook = start_key_hook();
    info!(show = %show_hotkey, quit = %quit_hotkey, "mouseless running");

    loop {
        let stroke = match hook.recv_timeout(POLL_INTERVAL) {
            Ok(stroke) => stroke,
            Err(_) => bail!("key hook stopped unexpectedly"),
        };

        let now = Instant::now();
        if let Some(stroke) = stroke {
            if controller.handle_stroke(stroke, now) == Flow::Quit {
                break;
            }
            hook.set_capture(controller.is_visible());
        }
        controller.tick(now);
    }

    hook.stop();
    info!("mouseless exiting");
    Ok(())
}
