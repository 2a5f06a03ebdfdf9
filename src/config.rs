//! Resolved settings for a single run

use crate::api::{HOMEBREW_API_BASE, REQUEST_TIMEOUT};
use crate::colors::ColorMode;
use crate::platform::MacosVersion;
use crate::report::EXPORT_FILE;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Brewfile to read
    pub brewfile: PathBuf,
    /// macOS version to check against
    pub macos_version: MacosVersion,
    /// Debug-level logging
    pub verbose: bool,
    /// Also write the results to [`EXPORT_FILE`]
    pub export: bool,
    /// Base URL of the Homebrew JSON API
    pub api_base: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub color: ColorMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brewfile: PathBuf::from("Brewfile"),
            macos_version: MacosVersion::BigSur,
            verbose: false,
            export: false,
            api_base: HOMEBREW_API_BASE.to_string(),
            timeout: REQUEST_TIMEOUT,
            color: ColorMode::Auto,
        }
    }
}

impl Config {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,brew_compat=debug"
        } else {
            "warn,brew_compat=info"
        }
    }

    /// Where `--export` writes, relative to the working directory
    pub fn export_path(&self) -> Option<PathBuf> {
        self.export.then(|| PathBuf::from(EXPORT_FILE))
    }
}
