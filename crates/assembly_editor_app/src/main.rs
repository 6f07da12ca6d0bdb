// SPDX-License-Identifier: MIT OR Apache-2.0
//! Assembly Editor - headless cinema-mode preview
//!
//! Loads preview settings, builds the demo assembly and replays a scripted
//! session of user inputs against cinema mode:
//! - Play and pause, forward and backward
//! - Speed changes and direction reversal
//! - Seeking and single-step skipping
//!
//! ## Architecture
//!
//! Playback lives in `assembly_editor_cinema`. This binary owns the scene,
//! feeds it to the controller through the hierarchy and visibility traits,
//! and drives the controller at a fixed frame rate.

mod cinema_mode;
mod preview;
mod runner;
mod state;

use preview::PreviewSettings;
use state::SceneData;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "assembly_editor_app=debug,assembly_editor_cinema=debug";

fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Assembly Editor v{}", env!("CARGO_PKG_VERSION"));

    let path = PreviewSettings::default_path();
    let mut settings = match PreviewSettings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load preview settings from {:?}: {e}", path);
            std::process::exit(1);
        }
    };

    let cinema_path = PreviewSettings::cinema_config_path(&path);
    if let Err(e) = settings.load_cinema_override(&cinema_path) {
        tracing::error!("Failed to load cinema config from {:?}: {e}", cinema_path);
        std::process::exit(1);
    }

    if std::env::args().any(|arg| arg == "--save-cinema-config") {
        if let Err(e) = settings.cinema.save(&cinema_path) {
            tracing::error!("Failed to save cinema config to {:?}: {e}", cinema_path);
            std::process::exit(1);
        }
        tracing::info!("Saved cinema config to {:?}", cinema_path);
        return;
    }

    if std::env::args().any(|arg| arg == "--print-settings") {
        match settings.to_ron() {
            Ok(content) => println!("{content}"),
            Err(e) => {
                tracing::error!("Failed to serialize preview settings: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let mut scene = SceneData::demo();
    let report = runner::run_preview(&settings, &mut scene);
    tracing::info!(
        "Ended in {} at index {} after {} frames; {} parts visible, {} state changes",
        report.final_state.name(),
        report.final_index,
        report.frames,
        report.visible_parts,
        report.entered.len()
    );
}
