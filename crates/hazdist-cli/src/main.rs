use hazdist_lib::cli::{ResolvedCommand, parse_args, resolve_command, run_fetch, run_resolve};
use hazdist_lib::error::HazDistError;
use hazdist_lib::progress::{IndicatifProgress, NoProgress, ProgressSink};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, HazDistError> {
    color_eyre::install()?;

    let args = parse_args();
    let command = resolve_command(args.command)?;
    let exit_code_policy = command.exit_code_policy();

    let result = match command {
        ResolvedCommand::Fetch(params) => {
            let progress: Box<dyn ProgressSink> = if params.show_progress {
                Box::new(IndicatifProgress::new("Downloading"))
            } else {
                Box::new(NoProgress)
            };
            run_fetch(params, progress.as_ref()).await.map(|_| ())
        }
        ResolvedCommand::Resolve(params) => run_resolve(params).await.map(|_| ()),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("{}", err);
            Ok(ExitCode::from(exit_code_policy.failure_code()))
        }
    }
}
