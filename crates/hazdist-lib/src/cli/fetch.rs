use crate::cli::FetchParams;
use crate::download::{DownloadedFile, archive_path, download_url, download_with_retry};
use crate::error::HazDistError;
use crate::http::build_client;
use crate::progress::ProgressSink;
use crate::version::resolve_version;
use tracing;

/// Resolves the current version, then downloads its archive into
/// `params.output_dir`. A failed version lookup is not retried.
pub async fn run_fetch(
    params: FetchParams,
    progress: &dyn ProgressSink,
) -> Result<DownloadedFile, HazDistError> {
    let FetchParams {
        base_url,
        output_dir,
        version_timeout,
        download,
        ..
    } = params;

    let client = build_client()?;

    tracing::info!("Resolving current version from {}", base_url);
    let version = resolve_version(&client, &base_url, version_timeout).await?;

    let url = download_url(&base_url, &version);
    let destination = archive_path(&output_dir, &version);

    tracing::info!(
        "Downloading version {} to {} (up to {} attempts)",
        version,
        destination.display(),
        download.retry.max_attempts
    );
    download_with_retry(&client, &url, &destination, &download, progress).await
}
