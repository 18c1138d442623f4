use serde_json::{json, Value};

use super::{required_str, run_tags, MetricsAdapter, PluginError};
use crate::config::RunConfig;

const DEFAULT_PREFIX: &str = "loadrelay_";

/// Pushes engine metrics to a Prometheus push gateway.
///
/// Export config: `push_gateway_url` (required), `prefix` and `labels` (optional). Labels are added
/// to the run tags.
pub struct PrometheusAdapter;

impl MetricsAdapter for PrometheusAdapter {
    fn build_metrics_plugin(
        &self,
        export_config: &Value,
        run_config: &RunConfig,
    ) -> Result<Value, PluginError> {
        let push_gateway = required_str(export_config, "prometheus", "push_gateway_url")?;
        let prefix = export_config
            .get("prefix")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PREFIX);

        let mut tags = run_tags(run_config);
        if let Some(labels) = export_config.get("labels").and_then(Value::as_object) {
            tags.extend(labels.clone());
        }

        let tags = tags
            .into_iter()
            .map(|(key, value)| match value {
                Value::String(value) => format!("{key}:{value}"),
                other => format!("{key}:{other}"),
            })
            .collect::<Vec<_>>();

        Ok(json!({
            "publish-metrics": [{
                "type": "prometheus",
                "pushgateway": push_gateway,
                "prefix": prefix,
                "tags": tags,
            }]
        }))
    }
}
