use super::types::VersionInfo;
use crate::error::HazDistError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing;
use url::Url;

/// Queries `base_url` once for the current distribution version.
///
/// There is no retry here: any failure is returned to the caller as-is.
pub async fn resolve_version(
    client: &Client,
    base_url: &Url,
    timeout: Duration,
) -> Result<String, HazDistError> {
    tracing::debug!(url = %base_url, timeout = ?timeout, "Requesting current version");

    let response = client
        .get(base_url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| HazDistError::Network {
            url: base_url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(HazDistError::Server {
            url: base_url.to_string(),
            status,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|source| HazDistError::Network {
            url: base_url.to_string(),
            source,
        })?;

    let info: VersionInfo =
        serde_json::from_slice(&body).map_err(|source| HazDistError::Decode {
            url: base_url.to_string(),
            source,
        })?;

    if info.version.is_empty() {
        return Err(HazDistError::EmptyVersion {
            url: base_url.to_string(),
        });
    }

    tracing::info!("Current version: {}", info.version);
    Ok(info.version)
}
