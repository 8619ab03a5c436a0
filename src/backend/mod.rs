// src/backend/mod.rs

pub mod http;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam::ExamDefinition,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
};

pub use http::HttpExamBackend;

/// The remote exam service a session talks to.
///
/// Implementations report every failure as an `AppError` and never retry.
#[async_trait]
pub trait ExamBackend: Send + Sync {
    /// Fails with `NotFound` when the course has no exam.
    async fn fetch_exam_for_course(&self, course_id: &str) -> Result<ExamDefinition, AppError>;

    /// `Ok(None)` means the student has not submitted yet.
    async fn fetch_submission(&self, exam_id: &str) -> Result<Option<SubmissionRecord>, AppError>;

    async fn submit_exam(
        &self,
        exam_id: &str,
        request: &SubmitExamRequest,
    ) -> Result<SubmissionRecord, AppError>;
}

/// Supplies the bearer token attached to backend calls.
pub trait TokenSource: Send + Sync {
    /// `None` sends the request unauthenticated; the backend answers `Unauthorized`.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token, e.g. read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenSource for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}
