// SPDX-License-Identifier: MIT OR Apache-2.0
//! Storyboard - headless host for the storyboard timeline
//!
//! Owns an authoritative storyboard, mounts the timeline over it and plays a
//! scripted editing session:
//! - Scene reorder by drag and drop
//! - Transition picks, including rejected ones
//! - Trim handles, ruler scrubbing and media drops
//! - Undo through bincode snapshots
//!
//! ## Usage
//!
//! `storyboard [CONFIG.ron]` prints a JSON session report on stdout. Without
//! an argument `storyboard.ron` in the working directory is used when
//! present, defaults otherwise. `RUST_LOG` controls log output on stderr.

mod history;
mod session;
mod storyboard;

use std::path::PathBuf;
use storyboard_timeline::{ConfigError, TimelineConfig};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Default config file name
const CONFIG_FILE_NAME: &str = "storyboard.ron";

/// Application errors
#[derive(Debug, Error)]
enum AppError {
    /// Settings could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The scripted session failed
    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    /// The report could not be written
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),
}

fn run(config_path: PathBuf) -> Result<String, AppError> {
    let config = TimelineConfig::load_or_default(&config_path)?;
    tracing::debug!(
        label_width = config.label_width,
        magnet = config.magnet_threshold,
        "Timeline settings loaded"
    );
    let report = session::run_demo(config)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storyboard=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Storyboard v{}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), PathBuf::from);

    match run(config_path) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            tracing::error!("Storyboard session failed: {e}");
            std::process::exit(1);
        }
    }
}
