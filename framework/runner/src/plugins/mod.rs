//! Metrics adapters that configure the engine to export its metrics.
//!
//! Adapters are looked up by name from a fixed registry. The export configuration arrives base64
//! encoded JSON and is handed to the adapter, whose output becomes the engine's plugin block.

mod influx;
mod prometheus;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use loadrelay_report_model::EngineConfig;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::RunConfig;

pub use influx::InfluxAdapter;
pub use prometheus::PrometheusAdapter;

/// Builds the engine plugin configuration for one metrics backend.
pub trait MetricsAdapter: Send + Sync {
    fn build_metrics_plugin(
        &self,
        export_config: &Value,
        run_config: &RunConfig,
    ) -> Result<Value, PluginError>;
}

const ADAPTERS: &[(&str, &dyn MetricsAdapter)] = &[
    ("prometheus", &PrometheusAdapter),
    ("influx", &InfluxAdapter),
];

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("unknown metrics plugin `{name}`")]
    UnknownPlugin { name: String },

    #[error("metrics export config is not valid base64")]
    Encoding(#[from] base64::DecodeError),

    #[error("metrics export config is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("metrics export config is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("metrics export config for `{plugin}` is missing `{field}`")]
    MissingField {
        plugin: &'static str,
        field: &'static str,
    },
}

/// Find the adapter registered under `name`, ignoring case.
pub fn resolve_adapter(name: &str) -> Result<&'static dyn MetricsAdapter, PluginError> {
    let name = name.to_lowercase();
    ADAPTERS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, adapter)| *adapter)
        .ok_or(PluginError::UnknownPlugin { name })
}

/// Decode the base64 encoded JSON export configuration.
pub fn decode_export_config(encoded: &str) -> Result<Value, PluginError> {
    let bytes = BASE64_STANDARD.decode(encoded.trim())?;
    let text = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&text)?)
}

/// Configure the metrics plugin on the engine, when both a plugin name and an export configuration
/// are set. Nothing is written to `config` unless every step succeeds.
pub fn inject_plugins(config: &mut EngineConfig, run_config: &RunConfig) -> Result<(), PluginError> {
    let (Some(name), Some(export_config)) = (
        run_config.metrics_plugin_name.as_deref(),
        run_config.metrics_export_config.as_deref(),
    ) else {
        return Ok(());
    };

    let adapter = resolve_adapter(name)?;
    let export_config = decode_export_config(export_config)?;
    let plugins = adapter.build_metrics_plugin(&export_config, run_config)?;

    log::info!("Configured metrics plugin `{name}`");
    config.plugins = Some(plugins);

    Ok(())
}

/// Tags that identify this run in exported metrics.
pub(crate) fn run_tags(run_config: &RunConfig) -> Map<String, Value> {
    let mut tags = Map::new();
    tags.insert("test_id".to_string(), run_config.test_id.clone().into());
    tags.insert("job_id".to_string(), run_config.job_id.clone().into());
    tags.insert(
        "container_id".to_string(),
        run_config.container_id().to_string().into(),
    );
    tags.insert("cluster".to_string(), run_config.cluster.clone().into());
    if let Some(environment) = &run_config.environment {
        tags.insert("environment".to_string(), environment.clone().into());
    }
    tags
}

pub(crate) fn required_str<'a>(
    export_config: &'a Value,
    plugin: &'static str,
    field: &'static str,
) -> Result<&'a str, PluginError> {
    export_config
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(PluginError::MissingField { plugin, field })
}
