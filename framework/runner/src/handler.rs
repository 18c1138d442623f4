use loadrelay_report_model::{PhaseStatus, ReportPost};

use crate::config::RunConfig;
use crate::connectors::ControlService;
use crate::error::RunError;

/// Report a fatal run error to the control service.
///
/// Aborts carry a snapshot of the runner configuration, errors carry the error message. This is a
/// single best-effort attempt, a failure to report is logged and the original error stands.
pub async fn report_failure(service: &dyn ControlService, config: &RunConfig, error: &RunError) {
    let post = match error.phase_status() {
        PhaseStatus::Aborted => {
            log::warn!("Test aborted: {}", error.chain());
            ReportPost::aborted(config.snapshot())
        }
        _ => {
            log::error!("Error occurred while running test: {}", error.chain());
            ReportPost::error(&error.chain())
        }
    };

    if let Err(e) = service.post_stats(config, &post).await {
        log::error!(
            "Failed to report {} status to the control service: {e}",
            post.phase_status
        );
    }
}
