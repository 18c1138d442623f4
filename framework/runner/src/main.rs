use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use loadrelay_runner::prelude::*;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = init();

    match start(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Runner exiting with failure: {e:?}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: RunnerCli) -> anyhow::Result<()> {
    let config = Arc::new(RunConfig::from_cli(cli)?);
    let shutdown_handle = start_shutdown_listener()?;

    let service = HttpControlService::new(&config)
        .context("Failed to build the control service client")?;
    let engine = ProcessEngine::new(config.engine_command.clone());
    let script_dir = std::env::current_dir().context("Failed to resolve working directory")?;

    let context = RunnerContext::new(
        config,
        Arc::new(service),
        Arc::new(engine),
        shutdown_handle.new_listener(),
        script_dir,
    );

    run(context).await?;
    Ok(())
}
