//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! `RUST_LOG` always wins; otherwise the level comes from `-v` flags. The terminal
//! front end owns stderr, so in that mode logs go to a file in the config directory.

use anyhow::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub target: LogTarget,
}

impl LogConfig {
    /// - 0 (no `-v`): info
    /// - 1 (`-v`): debug
    /// - 2+ (`-vv`): trace
    pub fn from_verbosity(verbosity: u8, target: LogTarget) -> Self {
        let level = match verbosity {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self { level, target }
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let level = self.level.as_str().to_lowercase();
            EnvFilter::new(format!(
                "warn,divine_words={level},divine_words_core={level},tower_http={level}"
            ))
        })
    }
}

pub fn init_logging(config: &LogConfig) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(config.filter());

    match &config.target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}
