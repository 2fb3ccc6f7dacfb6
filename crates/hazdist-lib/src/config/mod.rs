mod loader;
mod model;

pub use loader::{ENV_PREFIX, load_config};
pub use model::{
    Config, DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_OUTPUT_DIR, DEFAULT_RETRY_DELAY_SECS, DEFAULT_VERSION_TIMEOUT_SECS, ExitCodePolicy,
    RetryConfig,
};
