// src/backend/http.rs

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    backend::{ExamBackend, TokenSource},
    config::Config,
    error::AppError,
    models::{
        exam::ExamDefinition,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
};

/// `ExamBackend` over the exam REST API.
///
/// Every request carries the token from `auth` as `Authorization: Bearer`.
/// Nothing is retried.
pub struct HttpExamBackend {
    base_url: Url,
    client: reqwest::Client,
    auth: Arc<dyn TokenSource>,
}

impl HttpExamBackend {
    pub fn new(
        base_url: Url,
        client: reqwest::Client,
        auth: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            base_url,
            client,
            auth,
        }
    }

    pub fn from_config(config: &Config, auth: Arc<dyn TokenSource>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::ServerError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::new(config.api_base_url.clone(), client, auth))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ServerError(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AppError> {
        self.authorized(request).send().await.map_err(|e| {
            tracing::warn!("Exam backend unreachable: {}", e);
            AppError::from(e)
        })
    }
}

/// Turns a non-success response into the matching `AppError`, carrying the
/// backend's `{"error": ...}` message when there is one.
async fn error_from(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);

    tracing::warn!(%status, "Exam backend error: {}", message);
    AppError::from_status(status, message)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl ExamBackend for HttpExamBackend {
    async fn fetch_exam_for_course(&self, course_id: &str) -> Result<ExamDefinition, AppError> {
        let url = self.endpoint(&["api", "courses", course_id, "exam"])?;
        let response = self.send(self.client.get(url)).await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        decode(response).await
    }

    async fn fetch_submission(&self, exam_id: &str) -> Result<Option<SubmissionRecord>, AppError> {
        let url = self.endpoint(&["api", "exams", exam_id, "submission"])?;
        let response = self.send(self.client.get(url)).await?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => decode(response).await,
            _ => Err(error_from(response).await),
        }
    }

    async fn submit_exam(
        &self,
        exam_id: &str,
        request: &SubmitExamRequest,
    ) -> Result<SubmissionRecord, AppError> {
        let url = self.endpoint(&["api", "exams", exam_id, "submission"])?;
        let response = self.send(self.client.post(url).json(request)).await?;

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }
        decode(response).await
    }
}
