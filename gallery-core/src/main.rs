//! src/main.rs
//! ============================================================================
//! # Gallery Demo Entry Point
//!
//! Wires the in-memory data source, the generation and import plugins, and
//! the terminal event loop into a runnable demo gallery.

use std::{
    io::{self, Stdout},
    sync::Arc,
};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend as Backend};
use tracing::{info, warn};

use gallery_core::{
    GalleryConfig, Logger,
    controller::{event_loop::EventLoop, orchestrator::{Gallery, GalleryOptions}},
    plugins::{generate::GenerationPlugin, import::ImportPlugin},
    source::memory::MemoryDataSource,
};

type AppTerminal = Terminal<Backend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    Logger::init_tracing();
    info!("Starting gallery demo");

    let mut config = GalleryConfig::load().await.unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {}", e);
        GalleryConfig::default()
    });
    // The demo source is folder-capable; show the panel.
    config.folders_allowed = true;

    let source = Arc::new(MemoryDataSource::seeded());
    let mut gallery = Gallery::new(
        source.clone(),
        GalleryOptions {
            config,
            title: "Media Gallery".into(),
        },
    )
    .context("Failed to construct gallery")?;

    gallery.register_plugin(Box::new(GenerationPlugin::with_default_mode()));
    let import_dir = std::env::var("GALLERY_IMPORT_DIR").unwrap_or_else(|_| "./imports".into());
    gallery.register_plugin(Box::new(ImportPlugin::new(import_dir)));

    gallery.init().await;

    let mut event_loop = EventLoop::new(gallery);
    // Generation batches from the demo source stream back in as
    // notifications.
    source.set_notifier(event_loop.notification_sender());

    let mut terminal = setup_terminal().context("Failed to initialize terminal")?;
    let result = event_loop.run(&mut terminal).await;
    cleanup_terminal(&mut terminal).context("Failed to restore terminal")?;
    result.context("Event loop error")?;

    info!("Gallery exited cleanly");
    Ok(())
}

fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

fn setup_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let terminal = Terminal::new(Backend::new(stdout)).context("Failed to create terminal")?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
