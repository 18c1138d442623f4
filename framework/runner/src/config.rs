use std::time::Duration;

use anyhow::Context;
use serde::Serialize;
use url::Url;

use crate::cli::RunnerCli;

/// Path segment for the control service API, used when the configured URL has no path.
const DEFAULT_API_PATH: &str = "/v1";

/// Settings for one run, fixed once the runner starts.
///
/// Numeric overrides of zero are treated as unset, the control service sends `0` for values the
/// user left empty.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub environment: Option<String>,
    pub cluster: String,
    pub log_level: String,
    pub stats_interval: u64,
    pub test_id: String,
    pub job_id: String,
    pub job_type: String,
    /// Control service base URL, always carrying an API path.
    pub predator_url: String,
    pub duration: Option<u64>,
    pub arrival_rate: Option<u64>,
    pub arrival_count: Option<u64>,
    pub ramp_to: Option<u64>,
    pub max_vusers: Option<u64>,
    pub http_pool_size: u64,
    pub notes: Option<String>,
    pub metrics_plugin_name: Option<String>,
    pub metrics_export_config: Option<String>,
    pub proxy_url: Option<String>,
    pub delay_runner_ms: u64,
    pub report_id: String,
    pub predator_version: Option<String>,
    pub engine_command: String,
    container_id: String,
}

impl RunConfig {
    pub fn from_cli(cli: RunnerCli) -> anyhow::Result<Self> {
        let predator_url = service_url_with_api_version(&cli.predator_url)?;
        let container_id = container_id(cli.marathon_app_id.as_deref());

        Ok(Self {
            environment: cli.environment,
            cluster: cli.cluster,
            log_level: cli.log_level,
            stats_interval: cli.stats_interval,
            test_id: cli.test_id,
            job_id: cli.job_id,
            job_type: cli.job_type,
            predator_url,
            duration: cli.duration,
            arrival_rate: non_zero(cli.arrival_rate),
            arrival_count: non_zero(cli.arrival_count),
            ramp_to: non_zero(cli.ramp_to),
            max_vusers: non_zero(cli.max_virtual_users),
            http_pool_size: cli.http_pool_size,
            notes: cli.notes,
            metrics_plugin_name: cli.metrics_plugin_name.filter(|name| !name.is_empty()),
            metrics_export_config: cli.metrics_export_config.filter(|c| !c.is_empty()),
            proxy_url: cli.proxy_url.filter(|url| !url.is_empty()),
            delay_runner_ms: cli.delay_runner_ms,
            report_id: cli.report_id,
            predator_version: cli.predator_version.filter(|v| !v.is_empty()),
            engine_command: cli.engine_command,
            container_id,
        })
    }

    /// Identity of this runner instance, reported with every status update.
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.delay_runner_ms)
    }

    /// The configuration as JSON, used as the payload of `aborted` reports.
    pub fn snapshot(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("Failed to serialize runner config: {e}");
            String::from("{}")
        })
    }
}

fn non_zero(value: Option<u64>) -> Option<u64> {
    value.filter(|v| *v > 0)
}

/// Normalise the control service URL so that it always includes an API version path.
pub fn service_url_with_api_version(raw: &str) -> anyhow::Result<String> {
    let mut url =
        Url::parse(raw).with_context(|| format!("Invalid control service URL '{raw}'"))?;

    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DEFAULT_API_PATH);
    }

    Ok(url.to_string())
}

/// Pick the container id from the orchestration platform app id, or generate a fresh one.
pub fn container_id(platform_app_id: Option<&str>) -> String {
    platform_app_id
        .and_then(|app_id| app_id.rsplit('/').next())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| nanoid::nanoid!())
}

#[cfg(test)]
pub(crate) mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    pub(crate) fn sample_cli_cfg() -> RunnerCli {
        RunnerCli {
            environment: Some("test".to_string()),
            cluster: "default".to_string(),
            log_level: "info".to_string(),
            stats_interval: 30,
            test_id: "test-1".to_string(),
            job_id: "job-1".to_string(),
            job_type: "load_test".to_string(),
            predator_url: "http://predator.local".to_string(),
            duration: Some(120),
            arrival_rate: Some(5),
            arrival_count: None,
            ramp_to: None,
            max_virtual_users: None,
            http_pool_size: 250,
            notes: None,
            metrics_plugin_name: None,
            metrics_export_config: None,
            proxy_url: None,
            delay_runner_ms: 0,
            report_id: "report-1".to_string(),
            predator_version: None,
            marathon_app_id: None,
            engine_command: "loadrelay-engine".to_string(),
        }
    }

    #[test]
    fn container_id_from_platform_app_id() {
        assert_eq!("myapp123", container_id(Some("/predator/group/myapp123")));
        assert_eq!("solo", container_id(Some("solo")));
    }

    #[test]
    fn generated_container_ids_are_unique() {
        let first = RunConfig::from_cli(sample_cli_cfg()).unwrap();
        let second = RunConfig::from_cli(sample_cli_cfg()).unwrap();

        assert!(!first.container_id().is_empty());
        assert_ne!(first.container_id(), second.container_id());
    }

    #[test]
    fn trailing_slash_app_id_falls_back_to_generated() {
        let id = container_id(Some("/predator/group/"));
        assert!(!id.is_empty());
        assert_ne!("group", id);
    }

    #[test]
    fn api_version_added_only_when_path_missing() {
        assert_eq!(
            "http://predator.local/v1",
            service_url_with_api_version("http://predator.local").unwrap()
        );
        assert_eq!(
            "http://predator.local/v1",
            service_url_with_api_version("http://predator.local/").unwrap()
        );
        assert_eq!(
            "http://predator.local:8080/v2",
            service_url_with_api_version("http://predator.local:8080/v2").unwrap()
        );
        assert!(service_url_with_api_version("not a url").is_err());
    }

    #[test]
    fn zero_overrides_are_unset() {
        let mut cli = sample_cli_cfg();
        cli.ramp_to = Some(0);
        cli.max_virtual_users = Some(0);
        cli.arrival_count = Some(100);

        let config = RunConfig::from_cli(cli).unwrap();
        assert_eq!(None, config.ramp_to);
        assert_eq!(None, config.max_vusers);
        assert_eq!(Some(100), config.arrival_count);
    }

    #[test]
    fn zero_duration_is_kept() {
        let mut cli = sample_cli_cfg();
        cli.duration = Some(0);

        let config = RunConfig::from_cli(cli).unwrap();
        assert_eq!(Some(0), config.duration);
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let config = RunConfig::from_cli(sample_cli_cfg()).unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&config.snapshot()).unwrap();

        assert_eq!("test-1", snapshot["testId"]);
        assert_eq!(250, snapshot["httpPoolSize"]);
        assert_eq!(config.container_id(), snapshot["containerId"]);
    }
}
