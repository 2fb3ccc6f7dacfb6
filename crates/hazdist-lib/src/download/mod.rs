#[allow(clippy::module_inception)]
mod download;
mod retry;
mod types;

pub use download::{download_once, download_with_retry};
pub use retry::retry_with_fixed_delay;
pub use types::{
    ARCHIVE_EXTENSION, ARCHIVE_PREFIX, DownloadAttempt, DownloadOptions, DownloadedFile,
    RetryPolicy, VERSION_QUERY_PARAM, archive_file_name, archive_path, download_url,
};
