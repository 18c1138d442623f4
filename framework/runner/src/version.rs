use crate::error::{RunError, RunResult};

/// Version of this runner, checked against the control service before a run starts.
pub const RUNNER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check that the runner and the control service agree on major and minor version.
///
/// Patch versions may differ. A runner that was not told the control service version cannot be
/// checked and must not run.
pub fn verify_service_version(runner: &str, service: Option<&str>) -> RunResult<()> {
    let Some(service) = service else {
        log::error!("No control service version configured, cannot verify runner version {runner}");
        return Err(RunError::MissingServiceVersion);
    };

    match (major_minor(runner), major_minor(service)) {
        (Some(ours), Some(theirs)) if ours == theirs => {
            log::debug!("Runner version {runner} is compatible with control service {service}");
            Ok(())
        }
        _ => {
            log::error!(
                "Runner and control service must match in major and minor version, please change runner or control service version"
            );
            Err(RunError::VersionMismatch {
                runner: runner.to_string(),
                service: service.to_string(),
            })
        }
    }
}

/// Parse the major and minor components of a `major.minor.patch` version.
fn major_minor(version: &str) -> Option<(u64, u64)> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    // Pre-release and build metadata only ever follow the patch component.
    let mut parts = version.split(['.', '-', '+']);

    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
