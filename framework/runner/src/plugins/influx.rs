use serde_json::{json, Value};

use super::{required_str, run_tags, MetricsAdapter, PluginError};
use crate::config::RunConfig;

/// Writes engine metrics to InfluxDB.
///
/// Export config: `host` (required), `username`, `password` and `database` (optional).
pub struct InfluxAdapter;

impl MetricsAdapter for InfluxAdapter {
    fn build_metrics_plugin(
        &self,
        export_config: &Value,
        run_config: &RunConfig,
    ) -> Result<Value, PluginError> {
        let host = required_str(export_config, "influx", "host")?;
        let optional = |field: &str| export_config.get(field).cloned().unwrap_or(Value::Null);

        Ok(json!({
            "influxdb": {
                "testName": run_config.test_id,
                "testRunId": run_config.report_id,
                "measurementName": "latency",
                "errorMeasurementName": "clientErrors",
                "tags": run_tags(run_config),
                "influx": {
                    "host": host,
                    "username": optional("username"),
                    "password": optional("password"),
                    "database": optional("database"),
                }
            }
        }))
    }
}
