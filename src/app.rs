use crate::collector::archive::rollover_log;
use crate::collector::capture::PrimaryDisplay;
use crate::collector::keys::{PAUSE_KEY, QUIT_KEY, TEST_MODE_KEY};
use crate::collector::layout::{ArtifactCounts, DatasetLayout};
use crate::collector::messages::{InputEvent, OverlayView};
use crate::collector::overlay::WinitOverlay;
use crate::collector::ticker::OverlayTicker;
use crate::collector::{BoxSize, Dispatcher, Orchestrator, Session};
use crate::input::spawn_input_hook;
use crate::logging;
use crate::settings::{self, CollectorConfig};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

/// Dataset state after the startup steps that touch the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDataset {
    pub layout: DatasetLayout,
    pub box_size: BoxSize,
    pub archived: Option<PathBuf>,
    pub counts: Vec<(String, ArtifactCounts)>,
}

/// Creates the folder layout, rolls the click log over and loads the box config.
pub fn prepare_dataset(config: &CollectorConfig) -> Result<PreparedDataset> {
    let layout = DatasetLayout::new(config.base_dir.clone());
    layout.ensure_dirs(&config.classes)?;

    let archived = rollover_log(&layout)?;
    layout.ensure_log_file()?;

    let box_size = settings::load_box_size_or_default(&layout.config_path());
    let counts = config
        .classes
        .iter()
        .map(|(_, name)| (name.to_string(), layout.class_counts(name)))
        .collect();

    Ok(PreparedDataset {
        layout,
        box_size,
        archived,
        counts,
    })
}

pub fn help_line(config: &CollectorConfig) -> String {
    let class_keys: Vec<String> = config
        .classes
        .iter()
        .map(|(key, name)| format!("{key}={name}"))
        .collect();
    format!(
        "keys: {} | {TEST_MODE_KEY}=test mode, {PAUSE_KEY}=pause, {QUIT_KEY}=quit, arrows=resize box",
        class_keys.join(" ")
    )
}

pub fn run() -> Result<()> {
    logging::init(
        settings::env_flag(settings::DEBUG_ENV),
        std::env::var_os(settings::TRACE_FILE_ENV).map(PathBuf::from),
    );

    let config = CollectorConfig::from_env()?;
    let prepared = prepare_dataset(&config)?;
    tracing::info!("dataset root: {}", prepared.layout.root().display());
    if let Some(archive) = &prepared.archived {
        tracing::info!("previous click log archived to {}", archive.display());
    }
    for (name, counts) in &prepared.counts {
        tracing::info!("{name}: {} images, {} labels", counts.images, counts.labels);
    }
    tracing::info!(
        "box size: {}x{}",
        prepared.box_size.box_width,
        prepared.box_size.box_height
    );
    tracing::info!("{}", help_line(&config));

    let (event_tx, event_rx) = mpsc::channel::<InputEvent>();
    let (overlay_tx, overlay_rx) = mpsc::channel::<OverlayView>();

    // Held so a failed hook leaves the session idle instead of ending it.
    let _idle_tx = event_tx.clone();
    let _hook = spawn_input_hook(event_tx)?;

    let orchestrator = Orchestrator::new(
        prepared.layout.clone(),
        config.scale_factor,
        PrimaryDisplay,
    );
    let dispatcher = Dispatcher::new(
        config.classes.clone(),
        Session::new(prepared.box_size),
        orchestrator,
        prepared.layout.config_path(),
    )
    .with_overlay(overlay_tx);
    let dispatch = dispatcher.spawn(event_rx)?;

    run_overlay(overlay_rx, prepared.box_size);

    if dispatch.join().is_err() {
        tracing::error!("dispatcher thread panicked");
    }
    tracing::info!("exiting");
    Ok(())
}

/// Drives the indicator window on the main thread until the dispatcher quits.
fn run_overlay(views: Receiver<OverlayView>, box_size: BoxSize) {
    match WinitOverlay::create(box_size) {
        Ok(window) => {
            OverlayTicker::new(window, views, OverlayView::hidden(box_size)).run();
        }
        Err(err) => {
            tracing::warn!("overlay unavailable: {err:#}");
            // Keep the main thread alive until the channel closes on quit.
            while views.recv().is_ok() {}
        }
    }
}
