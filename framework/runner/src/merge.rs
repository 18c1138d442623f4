use std::path::Path;

use loadrelay_report_model::{EngineConfig, HttpSettings, Phase};

use crate::config::RunConfig;

/// Overlay the run settings onto the test's engine configuration.
///
/// The runner settings always win. Phase 0 gets the run's duration and arrival rate, ramp-to and
/// max virtual users are set when configured and removed otherwise. The HTTP pool size and the
/// stats interval are overwritten. Later phases are left alone.
pub fn update_test_parameters(
    config: &mut EngineConfig,
    run_config: &RunConfig,
    processor_path: Option<&Path>,
) {
    if let Some(path) = processor_path {
        config.processor = Some(path.display().to_string());
    }

    let phases = config.phases.get_or_insert_with(Vec::new);
    if phases.is_empty() {
        phases.push(Phase::default());
    }

    let first_phase = &mut phases[0];
    first_phase.duration = run_config.duration;
    first_phase.arrival_rate = run_config.arrival_rate;
    first_phase.ramp_to = run_config.ramp_to;
    first_phase.max_vusers = run_config.max_vusers;

    config
        .http
        .get_or_insert_with(HttpSettings::default)
        .pool = Some(run_config.http_pool_size);

    config.stats_interval = Some(run_config.stats_interval);

    match serde_json::to_string(config) {
        Ok(updated) => log::info!("Test successfully updated parameters: {updated}"),
        Err(e) => log::warn!("Test parameters updated but could not be logged: {e}"),
    }
}
