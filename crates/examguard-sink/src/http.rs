//! HTTP quiz provider and submission sink.

use async_trait::async_trait;
use tracing::instrument;

use examguard_core::model::QuizDefinition;
use examguard_core::traits::{
    QuizProvider, SubmissionPayload, SubmissionReceipt, SubmissionSink,
};

use crate::error::SinkError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("failed to build HTTP client")
}

fn map_send_error(e: reqwest::Error) -> SinkError {
    if e.is_timeout() {
        SinkError::Timeout(DEFAULT_TIMEOUT_SECS)
    } else {
        SinkError::Network(e.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(SinkError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 {
        let body = response.text().await.unwrap_or_default();
        return Err(SinkError::Unauthorized(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(SinkError::ApiError {
            status,
            message: body,
        });
    }
    Ok(response)
}

/// Fetches quiz definitions from `GET /api/quizzes/{ref}`.
pub struct HttpQuizProvider {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HttpQuizProvider {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client: build_client(),
        }
    }
}

#[async_trait]
impl QuizProvider for HttpQuizProvider {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(quiz_ref = %quiz_ref))]
    async fn fetch(&self, quiz_ref: &str) -> anyhow::Result<QuizDefinition> {
        let mut req = self
            .client
            .get(format!("{}/api/quizzes/{quiz_ref}", self.base_url));
        if let Some(token) = &self.api_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let response = req.send().await.map_err(map_send_error)?;

        if response.status().as_u16() == 404 {
            return Err(SinkError::QuizNotFound(quiz_ref.to_string()).into());
        }
        let response = check_status(response).await?;

        let quiz: QuizDefinition = response.json().await.map_err(|e| SinkError::ApiError {
            status: 0,
            message: format!("failed to parse quiz definition: {e}"),
        })?;
        Ok(quiz)
    }
}

/// Delivers submissions to `POST /api/submissions`.
pub struct HttpSink {
    base_url: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            client: build_client(),
        }
    }
}

#[async_trait]
impl SubmissionSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, payload), fields(quiz_id = %payload.quiz_id, attempt_id = %payload.attempt_id))]
    async fn submit(&self, payload: &SubmissionPayload) -> anyhow::Result<SubmissionReceipt> {
        let mut req = self
            .client
            .post(format!("{}/api/submissions", self.base_url))
            .header("content-type", "application/json");
        if let Some(token) = &self.api_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let response = req.json(payload).send().await.map_err(map_send_error)?;
        let response = check_status(response).await?;

        let receipt: SubmissionReceipt =
            response.json().await.map_err(|e| SinkError::ApiError {
                status: 0,
                message: format!("failed to parse receipt: {e}"),
            })?;
        Ok(receipt)
    }
}
