use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::model::{EnterpriseDetail, EnterpriseRecord, SimulationResult, TrainingReport};
use crate::policy::SimulationRequest;

pub const DEFAULT_TIMEOUT_SECS: u64 = 12;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    Shape(String),
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Server { status: 404, .. })
    }
}

/// Seam between the console and the remote service. Production uses
/// [`ApiClient`]; tests drive the console with stub implementations.
#[async_trait]
pub trait SimulationBackend: Send + Sync {
    async fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ClientError>;
    async fn fetch_enterprises(&self) -> Result<Vec<EnterpriseRecord>, ClientError>;
    async fn fetch_enterprise(&self, id: &str) -> Result<EnterpriseDetail, ClientError>;
    async fn train_model(&self) -> Result<TrainingReport, ClientError>;
}

/// HTTP client for the optimization service. The base URL and timeouts are
/// injected at construction; nothing is read from the environment.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("subsidy-console/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path);
        let response = self.http.get(&url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Server {
                status: status.as_u16(),
                message: server_message(status.as_u16(), &body),
            });
        }
        serde_json::from_str(&body).map_err(|err| ClientError::Shape(format!("{url}: {err}")))
    }
}

#[async_trait]
impl SimulationBackend for ApiClient {
    /// Exactly one outbound call per invocation; no retry, no caching.
    async fn run_simulation(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, ClientError> {
        self.get_json(
            "/optimize",
            &[
                ("budget", request.budget.to_string()),
                ("w_rev", request.w_revenue.to_string()),
                ("w_emp", request.w_employment.to_string()),
            ],
        )
        .await
    }

    async fn fetch_enterprises(&self) -> Result<Vec<EnterpriseRecord>, ClientError> {
        self.get_json("/msmes", &[]).await
    }

    async fn fetch_enterprise(&self, id: &str) -> Result<EnterpriseDetail, ClientError> {
        self.get_json(&format!("/msme/{id}"), &[]).await
    }

    async fn train_model(&self) -> Result<TrainingReport, ClientError> {
        self.get_json("/train", &[]).await
    }
}

/// Extracts a human-readable message from an error body. FastAPI puts the
/// failure text under `detail`; other deployments use `error` or `message`.
fn server_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                if !text.trim().is_empty() {
                    return text.trim().to_string();
                }
            }
        }
    }
    let preview: String = body.chars().take(180).collect();
    if preview.trim().is_empty() {
        format!("request failed with status {status}")
    } else {
        preview
    }
}
