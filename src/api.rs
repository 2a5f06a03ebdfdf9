//! Homebrew JSON API client with in-memory caching.
//!
//! [`BrewApi`] fetches per-package metadata from Homebrew's public JSON API
//! (`/formula/<name>.json` and `/cask/<token>.json`). Only the fields the
//! compatibility check needs are deserialized; everything else in the
//! payload is ignored.
//!
//! Responses are cached in memory for the lifetime of the client, so asking
//! for the same package twice costs one request.
//!
//! # Examples
//!
//! ```no_run
//! use brew_compat::api::BrewApi;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = BrewApi::new()?;
//!
//!     let formula = api.fetch_formula("wget").await?;
//!     if let Some(bottle) = formula.bottle.and_then(|b| b.stable) {
//!         println!("Bottles for: {:?}", bottle.files.keys().collect::<Vec<_>>());
//!     }
//!
//!     Ok(())
//! }
//! ```

use crate::brewfile::{Kind, PackageRequest};
use crate::compat::{MetadataRecord, SupportMatrix};
use crate::error::{CompatError, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

pub const HOMEBREW_API_BASE: &str = "https://formulae.brew.sh/api";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Homebrew formula metadata from JSON API
#[derive(Debug, Clone, Deserialize)]
pub struct Formula {
    pub name: String,
    #[serde(default)]
    pub versions: Versions,
    #[serde(default)]
    pub bottle: Option<Bottle>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Versions {
    /// Whether Homebrew publishes bottles for this formula at all
    #[serde(default)]
    pub bottle: Option<bool>,
}

/// Bottle metadata
#[derive(Debug, Clone, Deserialize)]
pub struct BottleData {
    /// Keyed by bottle tag (`big_sur`, `arm64_big_sur`, `all`, ...); only
    /// the tags matter, the per-file details are kept opaque
    #[serde(default)]
    pub files: HashMap<String, serde_json::Value>,
}

/// Bottle information from API
#[derive(Debug, Clone, Deserialize)]
pub struct Bottle {
    #[serde(default)]
    pub stable: Option<BottleData>,
}

/// A formula requirement such as `{"name": "macos", "version": "10.15"}`
#[derive(Debug, Clone, Deserialize)]
pub struct Requirement {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Cask metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Cask {
    pub token: String,
    #[serde(default)]
    pub depends_on: DependsOn,
}

/// Cask dependencies; only the macOS constraint is used
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependsOn {
    /// Comparator (`>=`, `<=`, `==`) to release numbers or codenames
    #[serde(default)]
    pub macos: Option<BTreeMap<String, ReleaseList>>,
}

/// The API usually sends a list but older payloads carry a bare string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReleaseList {
    Many(Vec<String>),
    One(String),
}

impl ReleaseList {
    pub fn values(&self) -> &[String] {
        match self {
            ReleaseList::Many(values) => values,
            ReleaseList::One(value) => std::slice::from_ref(value),
        }
    }
}

/// Homebrew API client with in-memory caching
#[derive(Clone)]
pub struct BrewApi {
    client: reqwest::Client,
    base_url: String,
    formula_cache: moka::future::Cache<String, Formula>,
    cask_cache: moka::future::Cache<String, Cask>,
}

impl BrewApi {
    /// Create a client for the public Homebrew API with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_base_url(HOMEBREW_API_BASE, REQUEST_TIMEOUT)
    }

    /// Create a client for an API mirror (or a test server)
    ///
    /// `base_url` is the directory containing `formula/` and `cask/`, e.g.
    /// `https://formulae.brew.sh/api`.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("brew-compat/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Lasts for the run; a Brewfile rarely names more than a few hundred packages
        let formula_cache = moka::future::Cache::new(1000);
        let cask_cache = moka::future::Cache::new(500);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            formula_cache,
            cask_cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch metadata for a specific formula by name (with in-memory caching).
    ///
    /// # Errors
    ///
    /// Returns [`CompatError::FormulaNotFound`] if the API answers 404, and
    /// [`CompatError::ApiError`] or [`CompatError::JsonError`] for transport
    /// failures and malformed payloads.
    pub async fn fetch_formula(&self, name: &str) -> Result<Formula> {
        if let Some(cached) = self.formula_cache.get(name).await {
            return Ok(cached);
        }

        let url = format!("{}/formula/{}.json", self.base_url, name);
        let body = self
            .get_json(&url, || CompatError::FormulaNotFound(name.to_string()))
            .await?;
        let formula: Formula = serde_json::from_str(&body)?;

        self.formula_cache
            .insert(name.to_string(), formula.clone())
            .await;

        Ok(formula)
    }

    /// Fetch specific cask by token (with in-memory caching)
    pub async fn fetch_cask(&self, token: &str) -> Result<Cask> {
        if let Some(cached) = self.cask_cache.get(token).await {
            return Ok(cached);
        }

        let url = format!("{}/cask/{}.json", self.base_url, token);
        let body = self
            .get_json(&url, || CompatError::CaskNotFound(token.to_string()))
            .await?;
        let cask: Cask = serde_json::from_str(&body)?;

        self.cask_cache.insert(token.to_string(), cask.clone()).await;

        Ok(cask)
    }

    /// Fetch whichever endpoint matches the request kind and reduce the
    /// payload to a [`MetadataRecord`]
    pub async fn fetch_record(&self, request: &PackageRequest) -> Result<MetadataRecord> {
        let record = match request.kind {
            Kind::Bottle => {
                let formula = self.fetch_formula(&request.name).await?;
                MetadataRecord {
                    name: request.name.clone(),
                    kind: Kind::Bottle,
                    support: SupportMatrix::from_formula(&formula),
                    known: formula.versions.bottle,
                }
            }
            Kind::Application => {
                let cask = self.fetch_cask(&request.name).await?;
                MetadataRecord {
                    name: request.name.clone(),
                    kind: Kind::Application,
                    support: SupportMatrix::from_cask(&cask),
                    known: None,
                }
            }
        };

        Ok(record)
    }

    async fn get_json(&self, url: &str, not_found: impl FnOnce() -> CompatError) -> Result<String> {
        debug!("Querying: {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(not_found());
        }

        Ok(response.error_for_status()?.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::{Status, classify};
    use crate::platform::MacosVersion;
    use httpmock::prelude::*;
    use serde_json::json;

    fn api_for(server: &MockServer) -> BrewApi {
        BrewApi::with_base_url(&server.base_url(), Duration::from_secs(5)).unwrap()
    }

    fn bottle_file(tag: &str) -> serde_json::Value {
        json!({
            "cellar": ":any",
            "url": format!("https://ghcr.io/v2/homebrew/core/wget/blobs/{}", tag),
            "sha256": "0000"
        })
    }

    #[tokio::test]
    async fn test_fetch_formula_parses_bottle_tags() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/formula/wget.json");
                then.status(200).json_body(json!({
                    "name": "wget",
                    "full_name": "wget",
                    "versions": { "stable": "1.21.1", "bottle": true },
                    "bottle": { "stable": { "rebuild": 0, "files": {
                        "big_sur": bottle_file("big_sur"),
                        "catalina": bottle_file("catalina")
                    }}},
                    "dependencies": ["openssl@1.1"]
                }));
            })
            .await;

        let api = api_for(&server);
        let formula = api.fetch_formula("wget").await.unwrap();

        mock.assert_async().await;
        assert_eq!(formula.name, "wget");
        let files = formula.bottle.unwrap().stable.unwrap().files;
        assert!(files.contains_key("big_sur"));
        assert!(files.contains_key("catalina"));
    }

    #[tokio::test]
    async fn test_sparse_bottle_entry_still_classifies() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/formula/wget.json");
                then.status(200).json_body(json!({
                    "name": "wget",
                    "bottle": { "stable": { "files": { "big_sur": { "cellar": ":any" } } } }
                }));
            })
            .await;

        let api = api_for(&server);
        let record = api
            .fetch_record(&PackageRequest::bottle("wget"))
            .await
            .unwrap();

        assert_eq!(
            classify(Some(&record), MacosVersion::BigSur),
            Status::Supported
        );
    }

    #[tokio::test]
    async fn test_fetch_formula_is_cached() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/formula/jq.json");
                then.status(200).json_body(json!({ "name": "jq" }));
            })
            .await;

        let api = api_for(&server);
        api.fetch_formula("jq").await.unwrap();
        api.fetch_formula("jq").await.unwrap();

        // Exactly one request reached the server
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cask/nope.json");
                then.status(404).body("Not Found");
            })
            .await;

        let api = api_for(&server);
        let err = api.fetch_cask("nope").await.unwrap_err();
        assert!(matches!(err, CompatError::CaskNotFound(ref t) if t == "nope"));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_server_error_and_bad_json() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/formula/broken.json");
                then.status(500).body("Internal Server Error");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/formula/garbled.json");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let api = api_for(&server);
        let err = api.fetch_formula("broken").await.unwrap_err();
        assert!(matches!(err, CompatError::ApiError(_)));
        assert!(!err.is_not_found());

        let err = api.fetch_formula("garbled").await.unwrap_err();
        assert!(matches!(err, CompatError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_fetch_record_for_cask() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/cask/docker.json");
                then.status(200).json_body(json!({
                    "token": "docker",
                    "name": ["Docker Desktop"],
                    "depends_on": { "macos": { ">=": ["10.15"] } }
                }));
            })
            .await;

        let api = api_for(&server);
        let record = api
            .fetch_record(&PackageRequest::application("docker"))
            .await
            .unwrap();

        assert_eq!(record.kind, Kind::Application);
        assert_eq!(record.known, None);
        assert_eq!(record.support.get(MacosVersion::Catalina), Some(true));
        assert_eq!(record.support.get(MacosVersion::Mojave), Some(false));
    }

    #[test]
    fn test_cask_accepts_bare_string_constraint() {
        let cask: Cask = serde_json::from_value(json!({
            "token": "legacy",
            "depends_on": { "macos": { ">=": "10.12" } }
        }))
        .unwrap();

        let macos = cask.depends_on.macos.unwrap();
        assert_eq!(macos[">="].values(), ["10.12".to_string()]);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let api = BrewApi::with_base_url("http://localhost:1234/api/", REQUEST_TIMEOUT).unwrap();
        assert_eq!(api.base_url(), "http://localhost:1234/api");
    }
}
