use crate::cli::args::Command;
use crate::cli::params::{FetchParams, ResolveParams};
use crate::config::{Config, ExitCodePolicy, load_config};
use crate::download::DownloadOptions;
use crate::error::HazDistError;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Fetch(FetchParams),
    Resolve(ResolveParams),
}

impl ResolvedCommand {
    pub fn exit_code_policy(&self) -> ExitCodePolicy {
        match self {
            ResolvedCommand::Fetch(params) => params.exit_code_policy,
            ResolvedCommand::Resolve(params) => params.exit_code_policy,
        }
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, HazDistError> {
    let url = Url::parse(base_url).map_err(|source| HazDistError::InvalidUrl {
        url: base_url.to_string(),
        source,
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(HazDistError::CliArgumentValidation {
            details: format!("Unsupported URL scheme '{}' in {base_url}.", url.scheme()),
        });
    }
    Ok(url)
}

fn validate_positive(values: &[(&str, u64)]) -> Result<(), HazDistError> {
    for (name, value) in values {
        if *value == 0 {
            return Err(HazDistError::CliArgumentValidation {
                details: format!("{name} must be greater than 0."),
            });
        }
    }
    Ok(())
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, HazDistError> {
    match command {
        Command::Fetch {
            config_path,
            base_url,
            output_dir,
            max_attempts,
            retry_delay_secs,
            version_timeout_secs,
            download_timeout_secs,
            exit_code_policy,
            show_progress,
        } => {
            let mut app_config = load_config(config_path.as_deref())?;

            if let Some(base_url) = base_url {
                app_config.base_url = base_url;
            }
            if let Some(output_dir) = output_dir {
                app_config.output_dir = PathBuf::from(output_dir);
            }
            if let Some(max_attempts) = max_attempts {
                app_config.retry.max_attempts = max_attempts;
            }
            if let Some(retry_delay_secs) = retry_delay_secs {
                app_config.retry.delay_secs = retry_delay_secs;
            }
            if let Some(version_timeout_secs) = version_timeout_secs {
                app_config.version_timeout_secs = version_timeout_secs;
            }
            if let Some(download_timeout_secs) = download_timeout_secs {
                app_config.download_timeout_secs = download_timeout_secs;
            }
            if let Some(exit_code_policy) = exit_code_policy {
                app_config.exit_code_policy = exit_code_policy;
            }

            validate_positive(&[
                ("max-attempts", app_config.retry.max_attempts as u64),
                ("version-timeout-secs", app_config.version_timeout_secs),
                ("download-timeout-secs", app_config.download_timeout_secs),
            ])?;

            if app_config.output_dir.as_os_str().is_empty() {
                return Err(HazDistError::CliArgumentValidation {
                    details: "No output directory provided. Configure output_dir or pass --output-dir."
                        .to_string(),
                });
            }

            Ok(ResolvedCommand::Fetch(fetch_params(app_config, show_progress)?))
        }
        Command::Resolve {
            config_path,
            base_url,
            version_timeout_secs,
        } => {
            let mut app_config = load_config(config_path.as_deref())?;

            if let Some(base_url) = base_url {
                app_config.base_url = base_url;
            }
            if let Some(version_timeout_secs) = version_timeout_secs {
                app_config.version_timeout_secs = version_timeout_secs;
            }

            validate_positive(&[("version-timeout-secs", app_config.version_timeout_secs)])?;

            Ok(ResolvedCommand::Resolve(ResolveParams {
                base_url: parse_base_url(&app_config.base_url)?,
                version_timeout: app_config.version_timeout(),
                exit_code_policy: app_config.exit_code_policy,
            }))
        }
    }
}

fn fetch_params(app_config: Config, show_progress: bool) -> Result<FetchParams, HazDistError> {
    Ok(FetchParams {
        base_url: parse_base_url(&app_config.base_url)?,
        version_timeout: app_config.version_timeout(),
        download: DownloadOptions::from(&app_config),
        exit_code_policy: app_config.exit_code_policy,
        output_dir: app_config.output_dir,
        show_progress,
    })
}
