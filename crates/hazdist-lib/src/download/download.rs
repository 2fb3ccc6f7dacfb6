use super::retry::retry_with_fixed_delay;
use super::types::{DownloadAttempt, DownloadOptions, DownloadedFile};
use crate::error::HazDistError;
use crate::progress::ProgressSink;
use crate::verification::ContentDigest;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info};
use url::Url;

async fn ensure_directory(dir: &Path) -> Result<(), HazDistError> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);
    builder
        .create(dir)
        .await
        .map_err(|e| HazDistError::io(dir, e))
}

async fn write_body(
    response: Response,
    destination: &Path,
    expected_len: Option<u64>,
    progress: &dyn ProgressSink,
) -> Result<DownloadedFile, HazDistError> {
    let file = tokio::fs::File::create(destination)
        .await
        .map_err(|e| HazDistError::io(destination, e))?;
    let mut writer = BufWriter::new(file);
    let mut digest = ContentDigest::new();

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| HazDistError::io(destination, std::io::Error::other(e)))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| HazDistError::io(destination, e))?;
        digest.update(&chunk);
        progress.advance(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| HazDistError::io(destination, e))?;

    let (size, sha256) =
        digest
            .verify(expected_len)
            .map_err(|source| HazDistError::Verification {
                path: destination.to_path_buf(),
                source,
            })?;

    Ok(DownloadedFile {
        path: destination.to_path_buf(),
        size,
        sha256,
    })
}

/// Downloads `url` into `destination` in a single request.
///
/// The destination is truncated first. On failure after the file was opened
/// the partially written file is left on disk.
pub async fn download_once(
    client: &Client,
    url: &Url,
    destination: &Path,
    timeout: Duration,
    progress: &dyn ProgressSink,
) -> Result<DownloadedFile, HazDistError> {
    debug!(url = %url, timeout = ?timeout, "Sending download request");
    let response = client
        .get(url.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|source| HazDistError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(HazDistError::Server {
            url: url.to_string(),
            status,
        });
    }

    if let Some(parent) = destination.parent() {
        ensure_directory(parent).await?;
    }

    // A zero length is treated the same as a missing header.
    let expected_len = response.content_length().filter(|len| *len > 0);
    debug!(url = %url, content_length = ?expected_len, output = %destination.display(), "Streaming response body");

    progress.start(expected_len);
    match write_body(response, destination, expected_len, progress).await {
        Ok(downloaded) => {
            progress.finish();
            Ok(downloaded)
        }
        Err(err) => {
            progress.abandon();
            Err(err)
        }
    }
}

impl DownloadAttempt<'_> {
    pub async fn run(
        &self,
        client: &Client,
        timeout: Duration,
        progress: &dyn ProgressSink,
    ) -> Result<DownloadedFile, HazDistError> {
        info!(attempt = self.number(), "Downloading {}", self.url);
        download_once(client, self.url, self.destination, timeout, progress).await
    }
}

/// Downloads `url` into `destination`, retrying the whole transfer according
/// to `options.retry`.
pub async fn download_with_retry(
    client: &Client,
    url: &Url,
    destination: &Path,
    options: &DownloadOptions,
    progress: &dyn ProgressSink,
) -> Result<DownloadedFile, HazDistError> {
    let downloaded = retry_with_fixed_delay(&options.retry, |index| {
        let attempt = DownloadAttempt {
            url,
            destination,
            index,
        };
        async move { attempt.run(client, options.timeout, progress).await }
    })
    .await?;

    info!(
        size = downloaded.size,
        sha256 = %downloaded.sha256,
        "File downloaded successfully: {}",
        downloaded.path.display()
    );
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_directory_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("downloads").join("nested");

        ensure_directory(&dir).await.unwrap();
        ensure_directory(&dir).await.unwrap();

        assert!(dir.is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_directory_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("downloads");

        ensure_directory(&dir).await.unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        // The process umask can only clear bits.
        assert_eq!(mode & !0o755, 0);
        assert_eq!(mode & 0o700, 0o700);
    }

    #[tokio::test]
    async fn test_ensure_directory_fails_on_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("downloads");
        std::fs::write(&file, b"not a directory").unwrap();

        let result = ensure_directory(&file).await;

        assert!(matches!(result, Err(HazDistError::Io { .. })));
    }
}
