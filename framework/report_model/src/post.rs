use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::PhaseInfo;

/// Status of a run as recorded by the control service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    StartedPhase,
    /// The first intermediate report of a run. Sent at most once.
    FirstIntermediate,
    Intermediate,
    Done,
    Aborted,
    Error,
}

impl PhaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::StartedPhase => "started_phase",
            PhaseStatus::FirstIntermediate => "first_intermediate",
            PhaseStatus::Intermediate => "intermediate",
            PhaseStatus::Done => "done",
            PhaseStatus::Aborted => "aborted",
            PhaseStatus::Error => "error",
        }
    }

    /// Whether this status carries an intermediate stats report.
    pub fn is_intermediate(&self) -> bool {
        matches!(
            self,
            PhaseStatus::FirstIntermediate | PhaseStatus::Intermediate
        )
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status update for the run's report.
///
/// `data` is a JSON document encoded as a string, which is how the control service stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_index: Option<String>,
    pub phase_status: PhaseStatus,
    pub data: String,
}

impl ReportPost {
    pub fn started_phase(info: &PhaseInfo) -> Self {
        Self {
            phase_index: Some(info.phase_index()),
            phase_status: PhaseStatus::StartedPhase,
            data: info.to_json().to_string(),
        }
    }

    pub fn intermediate(first: bool, report: Map<String, Value>) -> Self {
        Self {
            phase_index: None,
            phase_status: if first {
                PhaseStatus::FirstIntermediate
            } else {
                PhaseStatus::Intermediate
            },
            data: Value::Object(report).to_string(),
        }
    }

    pub fn done() -> Self {
        Self {
            phase_index: None,
            phase_status: PhaseStatus::Done,
            data: json!({ "message": "Test Finished" }).to_string(),
        }
    }

    /// An abort carrying a snapshot of the runner configuration, already encoded as JSON.
    pub fn aborted(context: String) -> Self {
        Self {
            phase_index: None,
            phase_status: PhaseStatus::Aborted,
            data: context,
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            phase_index: None,
            phase_status: PhaseStatus::Error,
            data: json!({ "message": message }).to_string(),
        }
    }
}
