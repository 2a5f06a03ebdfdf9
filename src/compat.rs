//! Compatibility classification.
//!
//! Homebrew metadata says different things for formulae and casks:
//!
//! - **Formulae** list one precompiled bottle per platform tag under
//!   `bottle.stable.files`. A bottle for a tag means the formula is known to
//!   work there. A missing bottle tells us nothing, because Homebrew may
//!   still build the formula from source. A `macos` requirement rules out
//!   every release older than its minimum.
//! - **Casks** declare `depends_on.macos` constraints such as
//!   `{">=": ["10.15"]}`, which settle every version one way or the other.
//!
//! Both are reduced to a [`SupportMatrix`], and [`classify`] turns a matrix
//! plus the requested version into a [`Status`].

use crate::api::{Cask, Formula};
use crate::brewfile::Kind;
use crate::platform::{MacosVersion, Release};
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Outcome of a compatibility check for one package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Supported,
    Unsupported,
    #[serde(rename = "No info")]
    NoInfo,
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Supported => "Supported",
            Status::Unsupported => "Unsupported",
            Status::NoInfo => "No info",
            Status::Unknown => "Unknown",
        }
    }

    /// Status text colored for the console table
    pub fn colored(self) -> ColoredString {
        match self {
            Status::Supported => self.as_str().green(),
            Status::Unsupported => self.as_str().red(),
            Status::NoInfo => self.as_str().yellow(),
            Status::Unknown => self.as_str().dimmed(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-version support flags; versions without an entry are unknown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportMatrix {
    flags: BTreeMap<MacosVersion, bool>,
}

impl SupportMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(true)` if supported, `Some(false)` if ruled out, `None` if the
    /// metadata says nothing about `version`
    pub fn get(&self, version: MacosVersion) -> Option<bool> {
        self.flags.get(&version).copied()
    }

    pub fn mark_supported(&mut self, version: MacosVersion) {
        // An explicit "unsupported" from another source is never overridden
        self.flags.entry(version).or_insert(true);
    }

    pub fn mark_unsupported(&mut self, version: MacosVersion) {
        self.flags.insert(version, false);
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Versions with explicit information, oldest tag last
    pub fn iter(&self) -> impl Iterator<Item = (MacosVersion, bool)> + '_ {
        self.flags.iter().map(|(v, s)| (*v, *s))
    }

    /// Derive support from a formula's bottles and `macos` requirement
    pub fn from_formula(formula: &Formula) -> Self {
        let mut matrix = Self::new();

        if let Some(requirement) = formula
            .requirements
            .iter()
            .filter(|r| r.name == "macos")
            .find_map(|r| r.version.as_deref())
        {
            match Release::parse(requirement) {
                Some(minimum) => {
                    for version in MacosVersion::ALL {
                        if version.release() < minimum {
                            matrix.mark_unsupported(version);
                        }
                    }
                }
                None => debug!(
                    "{}: unrecognized macOS requirement '{}'",
                    formula.name, requirement
                ),
            }
        }

        let files = formula
            .bottle
            .as_ref()
            .and_then(|b| b.stable.as_ref())
            .map(|data| &data.files);

        for tag in files.into_iter().flat_map(|f| f.keys()) {
            if tag == "all" {
                // Universal bottle: pours on every macOS version
                for version in MacosVersion::ALL {
                    matrix.mark_supported(version);
                }
            } else if let Some(version) = MacosVersion::from_tag(tag) {
                matrix.mark_supported(version);
            }
        }

        matrix
    }

    /// Derive support from a cask's `depends_on.macos` constraints
    pub fn from_cask(cask: &Cask) -> Self {
        let mut matrix = Self::new();

        let Some(constraints) = cask.depends_on.macos.as_ref() else {
            return matrix;
        };

        for (operator, values) in constraints {
            let releases: Vec<Release> = values
                .values()
                .iter()
                .filter_map(|v| Release::parse(v))
                .collect();

            let Some(check) = Constraint::new(operator, &releases) else {
                debug!(
                    "{}: ignoring macOS constraint {} {:?}",
                    cask.token,
                    operator,
                    values.values()
                );
                continue;
            };

            for version in MacosVersion::ALL {
                if check.allows(version.release()) {
                    matrix.mark_supported(version);
                } else {
                    matrix.mark_unsupported(version);
                }
            }
        }

        matrix
    }
}

/// A single `depends_on.macos` comparison
enum Constraint<'a> {
    AtLeast(Release),
    Above(Release),
    AtMost(Release),
    Below(Release),
    OneOf(&'a [Release]),
}

impl<'a> Constraint<'a> {
    fn new(operator: &str, releases: &'a [Release]) -> Option<Self> {
        let lowest = releases.iter().min().copied();
        let highest = releases.iter().max().copied();

        match operator {
            ">=" => lowest.map(Constraint::AtLeast),
            ">" => lowest.map(Constraint::Above),
            "<=" => highest.map(Constraint::AtMost),
            "<" => highest.map(Constraint::Below),
            "==" if !releases.is_empty() => Some(Constraint::OneOf(releases)),
            _ => None,
        }
    }

    fn allows(&self, release: Release) -> bool {
        match self {
            Constraint::AtLeast(min) => release >= *min,
            Constraint::Above(min) => release > *min,
            Constraint::AtMost(max) => release <= *max,
            Constraint::Below(max) => release < *max,
            Constraint::OneOf(list) => list.contains(&release),
        }
    }
}

/// Metadata for one package, reduced to what classification needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    pub name: String,
    pub kind: Kind,
    pub support: SupportMatrix,
    /// The API's own "bottle available" hint, formulae only
    pub known: Option<bool>,
}

/// Classify a package for `version`.
///
/// `record` is `None` when the metadata lookup failed or the service does
/// not know the name.
pub fn classify(record: Option<&MetadataRecord>, version: MacosVersion) -> Status {
    let Some(record) = record else {
        return Status::Unknown;
    };

    if record.support.is_empty() {
        return Status::NoInfo;
    }

    match record.support.get(version) {
        Some(true) => Status::Supported,
        Some(false) => Status::Unsupported,
        None => Status::NoInfo,
    }
}
