use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument};

use super::{RawDataset, Result, parse_dataset};
use crate::DataError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Download a dataset document over HTTP(S).
///
/// Non-success status codes are reported as [`DataError::Fetch`] so callers can
/// tell an unreachable dataset apart from a malformed one.
#[instrument(name = "Download dataset", skip(client), level = "info")]
pub async fn download_dataset(client: &Client, url: &str) -> Result<RawDataset> {
    info!(url, "Starting download");
    let response = client.get(url).timeout(FETCH_TIMEOUT).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataError::Fetch {
            source_name: url.to_string(),
            reason: format!("server responded with {status}"),
        });
    }

    let body = response.text().await?;
    info!(url, bytes = body.len(), "Download complete");
    parse_dataset(&body)
}
