//! Access to the control service, which stores test definitions and run reports.

mod http;

use async_trait::async_trait;
use loadrelay_report_model::{ReportPost, TestDefinition};
use thiserror::Error;

use crate::config::RunConfig;

pub use http::HttpControlService;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

/// Calls made by the runner to the control service.
#[async_trait]
pub trait ControlService: Send + Sync {
    /// Fetch the definition of the test the runner was started for.
    async fn get_test(&self, config: &RunConfig) -> Result<TestDefinition, ConnectorError>;

    /// Fetch a helper script, returned base64 encoded.
    async fn get_file(&self, config: &RunConfig, file_id: &str)
        -> Result<String, ConnectorError>;

    /// Register the report for this run.
    async fn create_report(
        &self,
        config: &RunConfig,
        test: &TestDefinition,
    ) -> Result<(), ConnectorError>;

    /// Record a status update on the run's report.
    async fn post_stats(&self, config: &RunConfig, post: &ReportPost)
        -> Result<(), ConnectorError>;
}
