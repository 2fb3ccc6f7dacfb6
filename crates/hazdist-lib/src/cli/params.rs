use crate::config::ExitCodePolicy;
use crate::download::DownloadOptions;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub base_url: Url,
    pub output_dir: PathBuf,
    pub version_timeout: Duration,
    pub download: DownloadOptions,
    pub exit_code_policy: ExitCodePolicy,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct ResolveParams {
    pub base_url: Url,
    pub version_timeout: Duration,
    pub exit_code_policy: ExitCodePolicy,
}
