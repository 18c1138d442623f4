use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An event emitted by the engine while a test executes.
///
/// On the wire each event is a JSON object tagged by its `event` field, for example
/// `{"event":"phase_started","index":0,"name":"warm up"}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    PhaseStarted(PhaseInfo),
    PhaseCompleted,
    Stats(StatsSnapshot),
    /// The engine finished every phase. This is always the last event of a run.
    Done {
        #[serde(default)]
        report: Value,
    },
}

/// Details of a phase as reported by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhaseInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PhaseInfo {
    /// The phase index as reported to the control service, phases without an index count as the
    /// first phase.
    pub fn phase_index(&self) -> String {
        self.index.unwrap_or(0).to_string()
    }

    pub fn to_json(&self) -> Value {
        let mut map = self.details.clone();
        if let Some(index) = self.index {
            map.insert("index".to_string(), Value::from(index));
        }
        Value::Object(map)
    }
}

/// Periodic statistics published by the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub completed_scenarios: u64,
    /// Scenarios that were skipped because the concurrency cap was reached.
    #[serde(default)]
    pub scenarios_avoided: u64,
    /// The intermediate report for the interval.
    #[serde(default)]
    pub report: Map<String, Value>,
}

impl StatsSnapshot {
    /// Scenarios that will not run again, either because they completed or were skipped.
    pub fn scenarios_settled(&self) -> u64 {
        self.completed_scenarios.saturating_add(self.scenarios_avoided)
    }

    /// The intermediate report without the raw per-request latency samples, which are too large to
    /// ship on every interval.
    pub fn into_shippable_report(self) -> Map<String, Value> {
        let mut report = self.report;
        report.remove("latencies");
        report
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_engine_lines() {
        let lines = [
            r#"{"event":"phase_started","index":1,"name":"ramp","duration":30}"#,
            r#"{"event":"phase_completed"}"#,
            r#"{"event":"stats","completed_scenarios":7,"scenarios_avoided":3,"report":{"latencies":[1,2]}}"#,
            r#"{"event":"done","report":{"scenariosCompleted":10}}"#,
        ];

        let events = lines
            .iter()
            .map(|line| serde_json::from_str::<LifecycleEvent>(line).unwrap())
            .collect::<Vec<_>>();

        match &events[0] {
            LifecycleEvent::PhaseStarted(info) => {
                assert_eq!(Some(1), info.index);
                assert_eq!(Some(&json!("ramp")), info.details.get("name"));
                assert!(!info.details.contains_key("event"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(LifecycleEvent::PhaseCompleted, events[1]);
        match &events[2] {
            LifecycleEvent::Stats(snapshot) => assert_eq!(10, snapshot.scenarios_settled()),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(
            LifecycleEvent::Done {
                report: json!({"scenariosCompleted": 10})
            },
            events[3]
        );
    }

    #[test]
    fn phase_without_index_is_the_first_phase() {
        let info = PhaseInfo::default();
        assert_eq!("0", info.phase_index());
        assert_eq!(json!({}), info.to_json());
    }

    #[test]
    fn shippable_report_drops_latencies_only() {
        let snapshot = StatsSnapshot {
            completed_scenarios: 1,
            scenarios_avoided: 0,
            report: json!({ "latencies": [[1, 2, 3]], "rps": { "mean": 4.5 } })
                .as_object()
                .cloned()
                .unwrap(),
        };

        let report = snapshot.into_shippable_report();
        assert_eq!(json!({ "rps": { "mean": 4.5 } }), Value::Object(report));
    }
}
