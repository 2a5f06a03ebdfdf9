//! Library interface for brew-compat
//!
//! Checks the formulae and casks named in a Brewfile against a macOS
//! version using Homebrew's JSON API.

pub mod api;
pub mod brewfile;
pub mod check;
pub mod colors;
pub mod compat;
pub mod config;
pub mod error;
pub mod platform;
pub mod report;

// Re-export commonly used items
pub use api::BrewApi;
pub use brewfile::{Kind, Manifest, PackageRequest, parse_brewfile};
pub use check::{CompatibilityRow, check_requests};
pub use compat::{MetadataRecord, Status, SupportMatrix, classify};
pub use config::Config;
pub use error::{CompatError, Result};
pub use platform::MacosVersion;
