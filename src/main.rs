//! Ferricom - NES frame pump and session controller
//!
//! Main entry point: wires the engine, session, frame pump, and UI
//! together and tears them down again when the window closes.

use anyhow::{Context, Result};
use fc_core::config::Config;
use fc_engine::NullEngine;
use fc_session::{FramePump, FrameTimer, Session};
use fc_video::create_frame_exchange;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting ferricom");

    let config = Config::load().context("failed to load configuration")?;
    std::fs::create_dir_all(&config.paths.roms)
        .with_context(|| format!("failed to create {}", config.paths.roms.display()))?;
    std::fs::create_dir_all(&config.paths.saves)
        .with_context(|| format!("failed to create {}", config.paths.saves.display()))?;

    let engine = NullEngine::new()
        .with_rewind_capacity(config.general.rewind_history as usize)
        .with_save_dir(config.paths.saves.clone());
    let session = Session::new(Box::new(engine)).context("engine initialization failed")?;

    let (producer, consumer) = create_frame_exchange();
    let timer = FrameTimer::with_frame_limit(config.general.frame_limit);
    let pump = FramePump::new(session.clone(), producer, timer).spawn()?;

    // Optional cartridge image on the command line; a preload failure is
    // not fatal, it opens the error dialog once the window is up
    let mut loaded_rom = None;
    let mut startup_error = None;
    if let Some(path) = std::env::args().nth(1).map(PathBuf::from) {
        match std::fs::read(&path) {
            Ok(image) => match session.load_cartridge(&image) {
                Ok(info) => {
                    info!(path = %path.display(), mapper = info.mapper, "cartridge preloaded");
                    loaded_rom = Some(path);
                }
                Err(e) => {
                    warn!(path = %path.display(), "could not load cartridge image: {}", e);
                    startup_error = Some(format!("Failed to load {}: {}", path.display(), e));
                }
            },
            Err(e) => {
                warn!(path = %path.display(), "could not read cartridge image: {}", e);
                startup_error = Some(format!("Failed to read {}: {}", path.display(), e));
            }
        }
    }

    let ui_result = fc_ui::run(config, session.clone(), consumer, loaded_rom, startup_error);

    // The pump stops after its in-flight tick, then the thread is joined
    session.shutdown();
    pump.join();
    info!("ferricom shut down");

    ui_result.map_err(|e| anyhow::anyhow!("UI error: {}", e))
}
