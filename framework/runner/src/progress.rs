use crate::config::RunConfig;

/// Converts the number of settled scenarios into a completion percentage.
///
/// The expected number of scenarios is derived once from the run settings:
/// - an arrival count is the total number of scenarios,
/// - a ramping phase starts `(arrival_rate + ramp_to) / 2` scenarios per second on average,
/// - otherwise `arrival_rate` scenarios start every second.
///
/// The concurrency cap does not change the total, scenarios skipped because of it are reported by
/// the engine as avoided and count towards progress.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCalculator {
    total_scenarios: u64,
}

impl ProgressCalculator {
    pub fn new(run_config: &RunConfig) -> Self {
        let total_scenarios = total_scenarios(run_config);
        log::debug!("Expecting {total_scenarios} scenarios in total");

        Self { total_scenarios }
    }

    pub fn total_scenarios(&self) -> u64 {
        self.total_scenarios
    }

    /// Percentage of the expected scenarios that have settled, between 0 and 100. When the total
    /// is unknown the progress is 0.
    pub fn percent(&self, settled_scenarios: u64) -> u8 {
        if self.total_scenarios == 0 {
            return 0;
        }

        let percent = (100.0 * settled_scenarios as f64 / self.total_scenarios as f64).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

fn total_scenarios(run_config: &RunConfig) -> u64 {
    if let Some(arrival_count) = run_config.arrival_count {
        return arrival_count;
    }

    let (Some(duration), Some(arrival_rate)) = (run_config.duration, run_config.arrival_rate)
    else {
        return 0;
    };

    match run_config.ramp_to {
        Some(ramp_to) => {
            duration.saturating_mul(arrival_rate.saturating_add(ramp_to)) / 2
        }
        None => duration.saturating_mul(arrival_rate),
    }
}
