use std::error::Error as StdError;
use std::path::PathBuf;

use loadrelay_core::prelude::ShutdownSignalError;
use loadrelay_report_model::PhaseStatus;
use thiserror::Error;

use crate::connectors::ConnectorError;
use crate::engine::EngineError;
use crate::plugins::PluginError;

pub type RunResult<T> = Result<T, RunError>;

/// A condition that ends a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(
        "runner version {runner} is not compatible with control service version {service}, major and minor versions must match"
    )]
    VersionMismatch { runner: String, service: String },

    #[error("control service version is not configured, runner version cannot be verified")]
    MissingServiceVersion,

    #[error("failed to fetch {what}")]
    Fetch {
        what: &'static str,
        #[source]
        source: ConnectorError,
    },

    #[error("helper script content is invalid: {reason}")]
    InvalidScript { reason: String },

    #[error("failed to persist helper script to {path}")]
    PersistScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve metrics plugin")]
    PluginResolution(#[from] PluginError),

    #[error("failed to {action} report")]
    ReportPost {
        action: &'static str,
        #[source]
        source: ConnectorError,
    },

    #[error("failed to start engine")]
    Engine(#[from] EngineError),

    #[error("engine stopped before reporting that the test was done")]
    EngineExited,

    #[error(transparent)]
    Aborted(#[from] ShutdownSignalError),
}

impl RunError {
    /// The status to report for this failure. Version mismatches and termination signals are
    /// reported as aborts, everything else as an error.
    pub fn phase_status(&self) -> PhaseStatus {
        match self {
            RunError::VersionMismatch { .. } | RunError::Aborted(_) => PhaseStatus::Aborted,
            _ => PhaseStatus::Error,
        }
    }

    pub fn aborted() -> Self {
        RunError::Aborted(ShutdownSignalError::default())
    }

    /// The error message followed by the messages of all its sources.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
