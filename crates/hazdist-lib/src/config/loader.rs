use super::Config;
use super::model::{
    DEFAULT_BASE_URL, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS, DEFAULT_OUTPUT_DIR,
    DEFAULT_RETRY_DELAY_SECS, DEFAULT_VERSION_TIMEOUT_SECS,
};
use crate::error::HazDistError;
use config::Config as ConfigBuilder;
use config::Environment;

pub const ENV_PREFIX: &str = "HAZDIST";

/// Layers built-in defaults, an optional config file and `HAZDIST_*`
/// environment variables, in increasing order of precedence.
pub fn load_config(config_path: Option<&str>) -> Result<Config, HazDistError> {
    let mut builder = ConfigBuilder::builder()
        .set_default("base_url", DEFAULT_BASE_URL)?
        .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
        .set_default("version_timeout_secs", DEFAULT_VERSION_TIMEOUT_SECS as i64)?
        .set_default("download_timeout_secs", DEFAULT_DOWNLOAD_TIMEOUT_SECS as i64)?
        .set_default("retry.max_attempts", DEFAULT_MAX_ATTEMPTS as i64)?
        .set_default("retry.delay_secs", DEFAULT_RETRY_DELAY_SECS as i64)?
        .set_default("exit_code_policy", "nonzero")?;

    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path));
    }

    let config_builder = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
