//! macOS version identifiers and release numbers.
//!
//! Homebrew names platforms with bottle tags like `big_sur` or
//! `arm64_big_sur`, while casks express their requirements as release
//! numbers (`10.15`, `11`) or codenames. This module maps between the two so
//! constraints can be evaluated against the tag the user asked about.
//!
//! # Examples
//!
//! ```
//! use brew_compat::platform::{MacosVersion, Release};
//!
//! let catalina = MacosVersion::Catalina;
//! assert_eq!(catalina.tag(), "catalina");
//! assert!(catalina.release() >= Release::parse("10.14").unwrap());
//!
//! // Big Sur is reported as either 11.0 or 10.16
//! assert_eq!(Release::parse("10.16"), Release::parse("11.0"));
//! ```

use std::fmt;

/// A macOS version the compatibility check can be run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, clap::ValueEnum)]
pub enum MacosVersion {
    #[value(name = "arm64_big_sur")]
    Arm64BigSur,
    #[value(name = "big_sur")]
    BigSur,
    #[value(name = "catalina")]
    Catalina,
    #[value(name = "mojave")]
    Mojave,
    #[value(name = "high_sierra")]
    HighSierra,
    #[value(name = "sierra")]
    Sierra,
    #[value(name = "el_capitan")]
    ElCapitan,
}

impl MacosVersion {
    pub const ALL: [MacosVersion; 7] = [
        MacosVersion::Arm64BigSur,
        MacosVersion::BigSur,
        MacosVersion::Catalina,
        MacosVersion::Mojave,
        MacosVersion::HighSierra,
        MacosVersion::Sierra,
        MacosVersion::ElCapitan,
    ];

    /// Bottle tag as it appears in `bottle.stable.files`
    pub fn tag(self) -> &'static str {
        match self {
            MacosVersion::Arm64BigSur => "arm64_big_sur",
            MacosVersion::BigSur => "big_sur",
            MacosVersion::Catalina => "catalina",
            MacosVersion::Mojave => "mojave",
            MacosVersion::HighSierra => "high_sierra",
            MacosVersion::Sierra => "sierra",
            MacosVersion::ElCapitan => "el_capitan",
        }
    }

    /// Release number of the OS this tag targets (architecture is ignored)
    pub fn release(self) -> Release {
        match self {
            MacosVersion::Arm64BigSur | MacosVersion::BigSur => Release::new(11, 0),
            MacosVersion::Catalina => Release::new(10, 15),
            MacosVersion::Mojave => Release::new(10, 14),
            MacosVersion::HighSierra => Release::new(10, 13),
            MacosVersion::Sierra => Release::new(10, 12),
            MacosVersion::ElCapitan => Release::new(10, 11),
        }
    }

    /// Look up a version by its exact bottle tag.
    ///
    /// Tags for platforms outside the supported set (`sonoma`,
    /// `x86_64_linux`, `all`, ...) return `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }
}

impl fmt::Display for MacosVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A macOS release number, normalized to codename granularity.
///
/// From Big Sur on, each major version is its own codename, so the minor
/// component is dropped. `10.16` is the compatibility number for Big Sur and
/// maps to `11.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Release {
    major: u32,
    minor: u32,
}

impl Release {
    pub fn new(major: u32, minor: u32) -> Self {
        match (major, minor) {
            (10, 16) => Release { major: 11, minor: 0 },
            (m, _) if m >= 11 => Release { major: m, minor: 0 },
            (m, n) => Release { major: m, minor: n },
        }
    }

    /// Parse a release number (`10.15`, `11`, `11.0.1`) or a codename
    /// (`catalina`, `:big_sur`) as used by cask `depends_on` clauses.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().trim_start_matches(':');

        if let Some(release) = codename_release(value) {
            return Some(release);
        }

        let mut parts = value.split('.');
        let major: u32 = parts.next()?.parse().ok()?;
        let minor: u32 = match parts.next() {
            Some(s) => s.parse().ok()?,
            None => 0,
        };

        Some(Release::new(major, minor))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn codename_release(name: &str) -> Option<Release> {
    let release = match name {
        "tahoe" => Release::new(26, 0),
        "sequoia" => Release::new(15, 0),
        "sonoma" => Release::new(14, 0),
        "ventura" => Release::new(13, 0),
        "monterey" => Release::new(12, 0),
        "big_sur" => Release::new(11, 0),
        "catalina" => Release::new(10, 15),
        "mojave" => Release::new(10, 14),
        "high_sierra" => Release::new(10, 13),
        "sierra" => Release::new(10, 12),
        "el_capitan" => Release::new(10, 11),
        "yosemite" => Release::new(10, 10),
        _ => return None,
    };
    Some(release)
}
