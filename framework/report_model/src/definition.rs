use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A load test as stored by the control service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestDefinition {
    /// The test id, matches the `TEST_ID` the runner was started with.
    pub id: String,
    /// Display name of the test.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reference to a helper script that must be fetched separately.
    ///
    /// The script is handed to the engine as its processor hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
    /// The engine-specific test script.
    #[serde(rename = "artillery_test")]
    pub script: EngineScript,
    /// Any other fields the control service sends, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The script handed to the engine.
///
/// Only the `config` block is understood by the runner. Scenarios and anything else are passed
/// through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EngineScript {
    #[serde(default)]
    pub config: EngineConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phases: Option<Vec<Phase>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpSettings>,
    /// Seconds between two `stats` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats_interval: Option<u64>,
    /// Plugin block, produced by a metrics adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Value>,
    /// Path to the helper script the engine loads as its processor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One arrival phase of a test.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Length of the phase in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// New scenarios started per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_rate: Option<u64>,
    /// Arrival rate reached by the end of the phase, ramping linearly from `arrival_rate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp_to: Option<u64>,
    /// Cap on concurrently running scenarios.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_vusers: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpSettings {
    /// Number of pooled connections the engine keeps open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample_definition() -> Value {
        json!({
            "id": "8a6f9c1e",
            "name": "checkout flow",
            "description": "buy things",
            "file_id": "f-1",
            "type": "basic",
            "artillery_test": {
                "config": {
                    "target": "http://shop.local",
                    "phases": [
                        { "duration": 60, "arrivalRate": 5, "rampTo": 5, "name": "warm up" },
                        { "duration": 30, "arrivalRate": 10 }
                    ],
                    "http": { "timeout": 10 }
                },
                "scenarios": [{ "flow": [{ "get": { "url": "/" } }] }]
            }
        })
    }

    #[test]
    fn decodes_known_fields() {
        let definition: TestDefinition = serde_json::from_value(sample_definition()).unwrap();

        assert_eq!("8a6f9c1e", definition.id);
        assert_eq!(Some("f-1".to_string()), definition.file_id);

        let phases = definition.script.config.phases.unwrap();
        assert_eq!(2, phases.len());
        assert_eq!(Some(60), phases[0].duration);
        assert_eq!(Some(5), phases[0].ramp_to);
        assert_eq!(None, phases[1].ramp_to);
        assert_eq!(Some(&json!("warm up")), phases[0].extra.get("name"));
        assert_eq!(None, definition.script.config.http.unwrap().pool);
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let definition: TestDefinition = serde_json::from_value(sample_definition()).unwrap();
        let encoded = serde_json::to_value(&definition).unwrap();

        assert_eq!(sample_definition(), encoded);
    }

    #[test]
    fn missing_config_block_defaults_to_empty() {
        let script: EngineScript = serde_json::from_value(json!({ "scenarios": [] })).unwrap();

        assert_eq!(EngineConfig::default(), script.config);
        assert!(script.extra.contains_key("scenarios"));
    }

    #[test]
    fn cleared_fields_are_not_serialized() {
        let phase = Phase {
            duration: Some(120),
            ..Default::default()
        };

        assert_eq!(json!({ "duration": 120 }), serde_json::to_value(&phase).unwrap());
    }
}
