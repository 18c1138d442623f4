use async_trait::async_trait;
use loadrelay_report_model::{ReportPost, TestDefinition};
use serde::{Deserialize, Serialize};

use super::{ConnectorError, ControlService};
use crate::config::RunConfig;

/// [ControlService] backed by the control service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpControlService {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct FileResponse {
    content: String,
}

#[derive(Serialize)]
struct CreateReportBody<'a> {
    report_id: &'a str,
    job_id: &'a str,
    runner_id: &'a str,
    test_type: &'a str,
    test_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    test_description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    start_time: i64,
}

#[derive(Serialize)]
struct StatsBody<'a> {
    stats_time: i64,
    runner_id: &'a str,
    #[serde(flatten)]
    post: &'a ReportPost,
}

impl HttpControlService {
    /// Build a client, routed through the configured proxy if there is one.
    pub fn new(config: &RunConfig) -> Result<Self, ConnectorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy_url) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url).map_err(ConnectorError::Client)?);
        }

        Ok(Self {
            client: builder.build().map_err(ConnectorError::Client)?,
        })
    }

    async fn send(
        &self,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<(String, reqwest::Response), ConnectorError> {
        log::trace!("Calling control service at {url}");
        let response = request.send().await.map_err(|source| ConnectorError::Request {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ConnectorError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        Ok((url, response))
    }
}

fn endpoint(config: &RunConfig, path: &str) -> String {
    format!("{}/{path}", config.predator_url.trim_end_matches('/'))
}

#[async_trait]
impl ControlService for HttpControlService {
    async fn get_test(&self, config: &RunConfig) -> Result<TestDefinition, ConnectorError> {
        let url = endpoint(config, &format!("tests/{}", config.test_id));
        let (url, response) = self.send(url.clone(), self.client.get(&url)).await?;

        response
            .json()
            .await
            .map_err(|source| ConnectorError::Decode { url, source })
    }

    async fn get_file(
        &self,
        config: &RunConfig,
        file_id: &str,
    ) -> Result<String, ConnectorError> {
        let url = endpoint(config, &format!("files/{file_id}"));
        let (url, response) = self.send(url.clone(), self.client.get(&url)).await?;

        let file: FileResponse = response
            .json()
            .await
            .map_err(|source| ConnectorError::Decode { url, source })?;
        Ok(file.content)
    }

    async fn create_report(
        &self,
        config: &RunConfig,
        test: &TestDefinition,
    ) -> Result<(), ConnectorError> {
        let url = endpoint(config, &format!("tests/{}/reports", config.test_id));
        let body = CreateReportBody {
            report_id: &config.report_id,
            job_id: &config.job_id,
            runner_id: config.container_id(),
            test_type: &config.job_type,
            test_name: &test.name,
            test_description: test.description.as_deref(),
            notes: config.notes.as_deref(),
            start_time: chrono::Utc::now().timestamp_millis(),
        };

        self.send(url.clone(), self.client.post(&url).json(&body))
            .await?;
        log::info!("Created report {} for test {}", config.report_id, test.id);
        Ok(())
    }

    async fn post_stats(
        &self,
        config: &RunConfig,
        post: &ReportPost,
    ) -> Result<(), ConnectorError> {
        let url = endpoint(
            config,
            &format!("tests/{}/reports/{}/stats", config.test_id, config.report_id),
        );
        let body = StatsBody {
            stats_time: chrono::Utc::now().timestamp_millis(),
            runner_id: config.container_id(),
            post,
        };

        self.send(url.clone(), self.client.post(&url).json(&body))
            .await?;
        if post.phase_status.is_intermediate() {
            log::debug!("Posted {} stats", post.phase_status);
        } else {
            log::info!("Posted {} status for report {}", post.phase_status, config.report_id);
        }
        Ok(())
    }
}
