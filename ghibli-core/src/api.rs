//! Backend port for the companion pages.
//!
//! `GhibliApi` is the seam between the quiz/oracle logic and the three backend
//! endpoints; `HttpGhibliApi` is the reqwest adapter used by the binary:
//! - `GET  /api/movies` — Catalog Snapshot
//! - `GET  /api/world`  — world quotes
//! - `POST /api/quiz`   — score an answer vector

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{Film, QuizResult, TraitTag, WorldSnapshot};

#[async_trait]
pub trait GhibliApi: Send + Sync {
    async fn movies(&self) -> Result<Vec<Film>, ApiError>;

    async fn world(&self) -> Result<WorldSnapshot, ApiError>;

    /// Submit a complete answer vector, one tag per question in order.
    async fn submit_quiz(&self, answers: &[TraitTag]) -> Result<QuizResult, ApiError>;
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct QuizRequest<'a> {
    answers: &'a [TraitTag],
}

#[derive(Debug, Clone)]
pub struct HttpGhibliApi {
    client: Client,
    base_url: String,
}

impl HttpGhibliApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config, config.base_url.clone())
    }

    /// Create a client against a custom base URL (tests, alternate hosts).
    pub fn with_base_url(config: &ApiConfig, base_url: String) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "Backend returned an error status");
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl GhibliApi for HttpGhibliApi {
    async fn movies(&self) -> Result<Vec<Film>, ApiError> {
        let url = format!("{}/api/movies", self.base_url);
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn world(&self) -> Result<WorldSnapshot, ApiError> {
        let url = format!("{}/api/world", self.base_url);
        let response = Self::check(self.client.get(&url).send().await?).await?;
        Ok(response.json().await?)
    }

    async fn submit_quiz(&self, answers: &[TraitTag]) -> Result<QuizResult, ApiError> {
        let url = format!("{}/api/quiz", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&QuizRequest { answers })
            .send()
            .await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }
}
