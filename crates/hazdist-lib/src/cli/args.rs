use crate::config::ExitCodePolicy;
use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Fetch {
        config_path: Option<String>,
        base_url: Option<String>,
        output_dir: Option<String>,
        max_attempts: Option<usize>,
        retry_delay_secs: Option<u64>,
        version_timeout_secs: Option<u64>,
        download_timeout_secs: Option<u64>,
        exit_code_policy: Option<ExitCodePolicy>,
        show_progress: bool,
    },
    Resolve {
        config_path: Option<String>,
        base_url: Option<String>,
        version_timeout_secs: Option<u64>,
    },
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "hazdist",
    version,
    about = "Download the current DPD hazardous goods distribution archive"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML or TOML)",
        global = true
    )]
    config: Option<String>,

    #[arg(
        long = "base-url",
        value_name = "URL",
        help = "Overrides the endpoint serving the version and the archive",
        global = true
    )]
    base_url: Option<String>,

    #[arg(
        long = "version-timeout-secs",
        value_name = "SECS",
        help = "Timeout for the version request",
        global = true
    )]
    version_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Resolve the current version and download its archive (default)
    Fetch(FetchArgs),

    /// Resolve and print the current version without downloading
    Resolve,
}

#[derive(Debug, Default, ClapArgs)]
struct FetchArgs {
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Overrides the directory the archive is written into"
    )]
    output_dir: Option<String>,

    #[arg(
        long = "max-attempts",
        value_name = "N",
        help = "Maximum download attempts, including the first one"
    )]
    max_attempts: Option<usize>,

    #[arg(
        long = "retry-delay-secs",
        value_name = "SECS",
        help = "Fixed delay between download attempts"
    )]
    retry_delay_secs: Option<u64>,

    #[arg(
        long = "download-timeout-secs",
        value_name = "SECS",
        help = "Timeout for a single download attempt"
    )]
    download_timeout_secs: Option<u64>,

    #[arg(
        long = "exit-code-policy",
        value_name = "POLICY",
        value_enum,
        help = "Exit status when the download finally fails"
    )]
    exit_code_policy: Option<ExitCodePolicy>,

    #[arg(long = "no-progress", help = "Disables the progress bar")]
    no_progress: bool,
}

fn into_command(cli: Cli) -> Command {
    match cli.command {
        Some(CliCommand::Resolve) => Command::Resolve {
            config_path: cli.config,
            base_url: cli.base_url,
            version_timeout_secs: cli.version_timeout_secs,
        },
        Some(CliCommand::Fetch(fetch)) => {
            fetch_command(cli.config, cli.base_url, cli.version_timeout_secs, fetch)
        }
        None => fetch_command(
            cli.config,
            cli.base_url,
            cli.version_timeout_secs,
            FetchArgs::default(),
        ),
    }
}

fn fetch_command(
    config_path: Option<String>,
    base_url: Option<String>,
    version_timeout_secs: Option<u64>,
    fetch: FetchArgs,
) -> Command {
    Command::Fetch {
        config_path,
        base_url,
        output_dir: fetch.output_dir,
        max_attempts: fetch.max_attempts,
        retry_delay_secs: fetch.retry_delay_secs,
        version_timeout_secs,
        download_timeout_secs: fetch.download_timeout_secs,
        exit_code_policy: fetch.exit_code_policy,
        show_progress: !fetch.no_progress,
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();
    let log_level = log_level(cli.verbose);

    let mut env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    if let Ok(directive) = "hyper_util=warn".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(env_filter)
        .init();

    Args {
        command: into_command(cli),
        log_level,
    }
}
