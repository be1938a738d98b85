//! Startup loading of the breed catalog into the shared validator.

use crate::config::BreedSource;
use anyhow::{Context, Result};
use log::{error, info};
use spycats_core::{parse_breed_catalog, BreedValidator};
use std::time::{Duration, Instant};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads the catalog from `source`, parses it and reloads `validator`.
///
/// Returns the number of accepted breeds. On failure the validator is left
/// untouched, so it stays not ready if this was the first load.
pub fn load_breeds(source: &BreedSource, validator: &BreedValidator) -> Result<usize> {
    let started_at = Instant::now();
    let result = read_catalog(source).and_then(|payload| {
        parse_breed_catalog(&payload).context("breed catalog could not be parsed")
    });

    match result {
        Ok(names) => {
            let count = validator.reload(names);
            info!(
                "event=breeds_load module=cli status=ok source={} count={} duration_ms={}",
                source_kind(source),
                count,
                started_at.elapsed().as_millis()
            );
            Ok(count)
        }
        Err(err) => {
            error!(
                "event=breeds_load module=cli status=error source={} duration_ms={} error_code=breeds_load_failed error={:#}",
                source_kind(source),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn read_catalog(source: &BreedSource) -> Result<String> {
    match source {
        BreedSource::File(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read breed catalog `{}`", path.display())),
        BreedSource::Url(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .context("failed to build HTTP client")?;
            client
                .get(url)
                .send()
                .and_then(|response| response.error_for_status())
                .and_then(|response| response.text())
                .with_context(|| format!("failed to fetch breed catalog from `{url}`"))
        }
    }
}

fn source_kind(source: &BreedSource) -> &'static str {
    match source {
        BreedSource::File(_) => "file",
        BreedSource::Url(_) => "url",
    }
}
