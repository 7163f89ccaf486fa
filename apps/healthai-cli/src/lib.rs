//! Shared start-up for the `healthai` CLI and the `healthai-server` binary.
pub mod server;

use healthai_core::config::{Config, Settings};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// `.env`, then layered config, with relative paths resolved against the working directory.
pub fn load_settings() -> anyhow::Result<Settings> {
    // A missing .env file is normal outside development.
    let _ = dotenvy::dotenv();
    let config = Config::load()?;
    let base = std::env::current_dir()?;
    Ok(config.settings()?.resolve_paths(&base))
}

/// Bar counting trees while the forest trains.
pub fn training_progress(n_trees: usize) -> ProgressBar {
    let pb = ProgressBar::new(n_trees as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} trees ({percent}%) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
