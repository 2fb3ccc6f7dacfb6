use crate::config::{
    Config, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ARCHIVE_PREFIX: &str = "dpd_distribution_HAZ_";
pub const ARCHIVE_EXTENSION: &str = "zip";
pub const VERSION_QUERY_PARAM: &str = "version";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: usize,
    /// Fixed pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadOptions {
    pub retry: RetryPolicy,
    /// Budget for a single attempt, body included
    pub timeout: Duration,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
        }
    }
}

impl From<&Config> for DownloadOptions {
    fn from(config: &Config) -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: config.retry.max_attempts,
                delay: config.retry_delay(),
            },
            timeout: config.download_timeout(),
        }
    }
}

/// One request/response/write cycle of the retry loop.
#[derive(Clone, Debug)]
pub struct DownloadAttempt<'a> {
    pub url: &'a Url,
    pub destination: &'a Path,
    /// Zero-based
    pub index: usize,
}

impl DownloadAttempt<'_> {
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub size: u64,
    /// Hex-encoded SHA-256 of the written content
    pub sha256: String,
}

fn sanitize_version_component(version: &str) -> String {
    version
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            _ => c,
        })
        .collect()
}

pub fn archive_file_name(version: &str) -> String {
    format!(
        "{}{}.{}",
        ARCHIVE_PREFIX,
        sanitize_version_component(version),
        ARCHIVE_EXTENSION
    )
}

pub fn archive_path(output_dir: impl AsRef<Path>, version: &str) -> PathBuf {
    output_dir.as_ref().join(archive_file_name(version))
}

/// Appends `version=<version>` to the query of `base_url`.
pub fn download_url(base_url: &Url, version: &str) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair(VERSION_QUERY_PARAM, version);
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    #[test]
    fn test_download_url_appends_version() {
        let base = Url::parse(DEFAULT_BASE_URL).unwrap();

        let url = download_url(&base, "5.2.1");

        assert_eq!(url.as_str(), format!("{DEFAULT_BASE_URL}?version=5.2.1"));
    }

    #[test]
    fn test_download_url_keeps_existing_query() {
        let base = Url::parse("http://localhost:8080/haz.aspx?customer=42").unwrap();

        let url = download_url(&base, "1.0");

        assert_eq!(
            url.as_str(),
            "http://localhost:8080/haz.aspx?customer=42&version=1.0"
        );
    }

    #[test]
    fn test_download_url_encodes_version() {
        let base = Url::parse("http://localhost/haz").unwrap();

        let url = download_url(&base, "1.0 beta&x");

        assert_eq!(url.as_str(), "http://localhost/haz?version=1.0+beta%26x");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "version").unwrap().1,
            "1.0 beta&x"
        );
    }

    #[test]
    fn test_archive_path() {
        assert_eq!(
            archive_path("downloads", "5.2.1"),
            PathBuf::from("downloads/dpd_distribution_HAZ_5.2.1.zip")
        );
    }

    #[test]
    fn test_archive_file_name_replaces_path_separators() {
        assert_eq!(
            archive_file_name("../5.2/1\\x"),
            "dpd_distribution_HAZ_.._5.2_1_x.zip"
        );
    }

    #[test]
    fn test_download_options_from_config() {
        let mut config = Config::default();
        config.retry.max_attempts = 4;
        config.retry.delay_secs = 1;
        config.download_timeout_secs = 20;

        let options = DownloadOptions::from(&config);

        assert_eq!(options.retry.max_attempts, 4);
        assert_eq!(options.retry.delay, Duration::from_secs(1));
        assert_eq!(options.timeout, Duration::from_secs(20));
        assert_eq!(DownloadOptions::from(&Config::default()), DownloadOptions::default());
    }

    #[test]
    fn test_attempt_number_is_one_based() {
        let url = Url::parse("http://localhost/").unwrap();
        let attempt = DownloadAttempt {
            url: &url,
            destination: Path::new("downloads/a.zip"),
            index: 0,
        };

        assert_eq!(attempt.number(), 1);
    }
}
