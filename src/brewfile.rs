//! Brewfile parsing
//!
//! Brewfiles are declarative package lists with one directive per line:
//!
//! ```text
//! tap "homebrew/cask-fonts"
//! brew "wget"
//! brew "postgresql@14", restart_service: true
//! cask "docker"
//! ```
//!
//! Only `brew` and `cask` directives produce requests. Taps and formulae
//! from third-party repositories are skipped with a warning; other
//! directives (`mas`, `vscode`, ...) are ignored.

use crate::error::{CompatError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// What kind of Homebrew package a request refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    /// A core formula, installed from a bottle
    Bottle,
    /// A cask (GUI application)
    Application,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bottle => "Bottle",
            Kind::Application => "Application",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single package named in the Brewfile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRequest {
    pub name: String,
    pub kind: Kind,
}

impl PackageRequest {
    pub fn bottle(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Bottle,
        }
    }

    pub fn application(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Kind::Application,
        }
    }
}

/// Parsed Brewfile contents
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Formulae in file order
    pub bottles: Vec<String>,
    /// Casks in file order
    pub casks: Vec<String>,
    /// Taps that were declared and skipped
    pub skipped_taps: Vec<String>,
}

impl Manifest {
    /// All requests in report order: bottles first, then casks
    pub fn requests(&self) -> Vec<PackageRequest> {
        self.bottles
            .iter()
            .map(PackageRequest::bottle)
            .chain(self.casks.iter().map(PackageRequest::application))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bottles.is_empty() && self.casks.is_empty()
    }
}

/// Read and parse a Brewfile from disk
pub fn read_brewfile(path: &Path) -> Result<Manifest> {
    if !path.is_file() {
        return Err(CompatError::ManifestNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    Ok(parse_brewfile(&content))
}

/// Parse Brewfile contents
///
/// Repeated directives for the same package are collapsed into the first
/// occurrence.
pub fn parse_brewfile(content: &str) -> Manifest {
    let mut manifest = Manifest::default();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (directive, rest) = match line.find(|c: char| c.is_whitespace() || c == '(') {
            Some(pos) => (&line[..pos], &line[pos..]),
            None => (line, ""),
        };

        let rest = rest.trim_start().trim_start_matches('(');
        let Some(name) = extract_quoted_string(rest) else {
            debug!("Line {}: no package name in '{}'", line_no, line);
            continue;
        };

        match directive {
            "tap" => {
                warn!(
                    "Line {}: third-party tap '{}' is not supported, skipping",
                    line_no, name
                );
                manifest.skipped_taps.push(name.to_string());
            }
            "brew" | "cask" => {
                let (names, official_tap) = if directive == "brew" {
                    (&mut manifest.bottles, "homebrew/core/")
                } else {
                    (&mut manifest.casks, "homebrew/cask/")
                };

                // Fully qualified names from the official repositories are looked up bare
                let name = name.strip_prefix(official_tap).unwrap_or(name);

                if is_tap_qualified(name) {
                    warn!(
                        "Line {}: '{}' comes from a third-party tap and is not supported, skipping",
                        line_no, name
                    );
                } else {
                    push_unique(names, name, line_no);
                }
            }
            other => {
                debug!("Line {}: ignoring '{}' directive", line_no, other);
            }
        }
    }

    manifest
}

fn push_unique(names: &mut Vec<String>, name: &str, line_no: usize) {
    if names.iter().any(|n| n == name) {
        debug!("Line {}: duplicate entry '{}' ignored", line_no, name);
    } else {
        names.push(name.to_string());
    }
}

/// `user/repo/formula` names live in a tap rather than the core repositories
fn is_tap_qualified(name: &str) -> bool {
    name.matches('/').count() >= 2
}

/// Extract the first quoted string: `"name", opts` or `'name'`
fn extract_quoted_string(s: &str) -> Option<&str> {
    let quote = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let inner = &s[1..];
    let end = inner.find(quote)?;
    let name = inner[..end].trim();
    (!name.is_empty()).then_some(name)
}
