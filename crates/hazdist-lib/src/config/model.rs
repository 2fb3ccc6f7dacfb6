use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str =
    "https://esolutions.dpd.com/partnerloesungen/hazdistributionservice.aspx";
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";
pub const DEFAULT_VERSION_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 10 * 60;
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Endpoint serving both the version document and the archive
    pub base_url: String,
    /// Directory the archive is written into
    pub output_dir: PathBuf,
    pub version_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub retry: RetryConfig,
    pub exit_code_policy: ExitCodePolicy,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub delay_secs: u64,
}

/// Process exit status used when the run fails after all retries.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExitCodePolicy {
    #[default]
    Nonzero,
    /// Report failure only through the log, exit with 0
    Zero,
}

impl ExitCodePolicy {
    pub fn failure_code(self) -> u8 {
        match self {
            ExitCodePolicy::Nonzero => 1,
            ExitCodePolicy::Zero => 0,
        }
    }
}

impl Config {
    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry.delay_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            version_timeout_secs: DEFAULT_VERSION_TIMEOUT_SECS,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            retry: RetryConfig {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                delay_secs: DEFAULT_RETRY_DELAY_SECS,
            },
            exit_code_policy: ExitCodePolicy::default(),
        }
    }
}
