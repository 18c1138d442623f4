use crate::context::RunnerContext;
use crate::error::{RunError, RunResult};
use crate::handler::report_failure;
use crate::orchestrator::RunOrchestrator;
use crate::version::{verify_service_version, RUNNER_VERSION};

/// Run the test described by the context and report how it ended.
///
/// Any failure, including a termination signal, is reported to the control service once before it
/// is returned. The caller decides how the process exits.
pub async fn run(context: RunnerContext) -> RunResult<()> {
    log::info!("Initialized test runner: {}", context.config().snapshot());

    let result = start(&context).await;
    match &result {
        Ok(()) => log::info!("Finished running test successfully"),
        Err(error) => {
            report_failure(context.service().as_ref(), context.config(), error).await;
        }
    }

    result
}

async fn start(context: &RunnerContext) -> RunResult<()> {
    let mut shutdown_listener = context.shutdown_listener();

    let delay = context.config().startup_delay();
    if !delay.is_zero() {
        log::info!("Sleeping for {} ms before starting runner", delay.as_millis());
        tokio::select! {
            biased;
            _ = shutdown_listener.wait_for_shutdown() => return Err(RunError::aborted()),
            _ = tokio::time::sleep(delay) => {}
        }
    }

    if shutdown_listener.should_shutdown() {
        return Err(RunError::aborted());
    }

    verify_service_version(
        RUNNER_VERSION,
        context.config().predator_version.as_deref(),
    )?;

    RunOrchestrator::new(context.clone()).run().await
}
