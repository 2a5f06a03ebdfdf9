//! Sequential fetch-and-classify loop

use crate::api::BrewApi;
use crate::brewfile::{self, Kind, PackageRequest};
use crate::compat::{Status, classify};
use crate::config::Config;
use crate::error::Result;
use crate::platform::MacosVersion;
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityRow {
    pub kind: Kind,
    pub name: String,
    pub status: Status,
}

/// Check every request against `version`, one request at a time.
///
/// Produces exactly one row per request, in request order. A failed lookup
/// is logged and reported as [`Status::Unknown`]; it never aborts the run.
pub async fn check_requests(
    api: &BrewApi,
    requests: &[PackageRequest],
    version: MacosVersion,
    progress: &ProgressBar,
) -> Vec<CompatibilityRow> {
    let mut rows = Vec::with_capacity(requests.len());

    for request in requests {
        progress.set_message(format!("Checking {}...", request.name));

        let record = match api.fetch_record(request).await {
            Ok(record) => {
                debug!(
                    "Support data for {}: {:?} (bottle hint: {:?})",
                    request.name,
                    record.support.iter().collect::<Vec<_>>(),
                    record.known
                );
                Some(record)
            }
            Err(e) if e.is_not_found() => {
                warn!("Unknown formula: {}", request.name);
                None
            }
            Err(e) => {
                warn!("Could not get details for {}: {}", request.name, e);
                None
            }
        };

        rows.push(CompatibilityRow {
            kind: request.kind,
            name: request.name.clone(),
            status: classify(record.as_ref(), version),
        });
        progress.inc(1);
    }

    rows
}

/// Read the configured Brewfile and check every package in it.
///
/// Only a missing or unreadable Brewfile (or a client that cannot be built)
/// is an error; per-package failures end up as rows.
pub async fn run(config: &Config, progress: &ProgressBar) -> Result<Vec<CompatibilityRow>> {
    let manifest = brewfile::read_brewfile(&config.brewfile)?;

    info!("Using Brewfile: {}", config.brewfile.display());
    info!("Checking compatibility for {}", config.macos_version);
    debug!("The core formulae are: [{}]", manifest.bottles.join(", "));
    debug!("The cask formulae are: [{}]", manifest.casks.join(", "));
    if !manifest.skipped_taps.is_empty() {
        info!(
            "Skipped {} third-party tap(s): {}",
            manifest.skipped_taps.len(),
            manifest.skipped_taps.join(", ")
        );
    }

    let requests = manifest.requests();
    if requests.is_empty() {
        progress.finish_and_clear();
        warn!("No formulae or casks found in {}", config.brewfile.display());
        return Ok(Vec::new());
    }

    let api = BrewApi::with_base_url(&config.api_base, config.timeout)?;

    info!("Getting details from Homebrew API for formulae, hold on...");
    progress.set_length(requests.len() as u64);
    let rows = check_requests(&api, &requests, config.macos_version, progress).await;
    progress.finish_and_clear();

    Ok(rows)
}
