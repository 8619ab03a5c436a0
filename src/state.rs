// src/state.rs

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    clock::Clock,
    config::Config,
    error::AppError,
    models::{exam::ExamDefinition, submission::SubmissionRecord},
};

#[derive(Clone)]
pub struct AppState {
    pub store: ExamStore,
    pub config: Config,
    pub clock: Arc<dyn Clock>,
}

impl FromRef<AppState> for ExamStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Clock> {
    fn from_ref(state: &AppState) -> Self {
        state.clock.clone()
    }
}

#[derive(Default)]
struct StoreInner {
    /// Keyed by course id. One exam per course.
    exams: HashMap<String, ExamDefinition>,
    /// Keyed by (exam id, student id).
    submissions: HashMap<(String, String), SubmissionRecord>,
}

/// In-memory exams and submissions for the reference backend.
#[derive(Clone, Default)]
pub struct ExamStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl ExamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `exam` under `course_id`, replacing any previous exam for it.
    /// Exam ids are unique across courses.
    pub async fn insert_exam(&self, course_id: &str, mut exam: ExamDefinition) -> Result<(), AppError> {
        exam.validate()?;
        exam.course_id = Some(course_id.to_string());

        let mut inner = self.inner.write().await;
        let taken = inner
            .exams
            .iter()
            .any(|(course, existing)| course != course_id && existing.id == exam.id);
        if taken {
            return Err(AppError::ValidationError(format!(
                "Exam id '{}' is already used by another course",
                exam.id
            )));
        }
        inner.exams.insert(course_id.to_string(), exam);
        Ok(())
    }

    pub async fn exam_for_course(&self, course_id: &str) -> Option<ExamDefinition> {
        self.inner.read().await.exams.get(course_id).cloned()
    }

    pub async fn exam(&self, exam_id: &str) -> Option<ExamDefinition> {
        self.inner
            .read()
            .await
            .exams
            .values()
            .find(|e| e.id == exam_id)
            .cloned()
    }

    pub async fn submission(&self, exam_id: &str, student_id: &str) -> Option<SubmissionRecord> {
        self.inner
            .read()
            .await
            .submissions
            .get(&(exam_id.to_string(), student_id.to_string()))
            .cloned()
    }

    /// Stores the first submission of a student for an exam. Later ones are refused.
    pub async fn insert_submission(
        &self,
        student_id: &str,
        record: SubmissionRecord,
    ) -> Result<SubmissionRecord, AppError> {
        let key = (record.exam_id.clone(), student_id.to_string());
        let mut inner = self.inner.write().await;

        if inner.submissions.contains_key(&key) {
            return Err(AppError::InvalidTransition(format!(
                "Exam '{}' already submitted",
                record.exam_id
            )));
        }
        inner.submissions.insert(key, record.clone());
        Ok(record)
    }

    /// Loads a JSON array of `{ "courseId": ..., ...exam }` objects.
    pub async fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<usize, AppError> {
        let raw = tokio::fs::read_to_string(path.as_ref())
            .await
            .map_err(|e| AppError::ServerError(format!("Failed to read seed file: {}", e)))?;
        let exams: Vec<ExamDefinition> = serde_json::from_str(&raw)?;

        let count = exams.len();
        for exam in exams {
            let course_id = exam.course_id.clone().ok_or_else(|| {
                AppError::ValidationError(format!("Seeded exam '{}' has no courseId", exam.id))
            })?;
            self.insert_exam(&course_id, exam).await?;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::{exam, t0};
    use chrono::Duration;

    #[tokio::test]
    async fn test_second_submission_refused() {
        let store = ExamStore::new();
        store.insert_exam("course-1", exam(Duration::hours(1), 30)).await.unwrap();

        let record = SubmissionRecord {
            exam_id: "exam-1".to_string(),
            submitted_at: t0(),
            answers: Default::default(),
        };
        store.insert_submission("7", record.clone()).await.unwrap();
        assert!(matches!(
            store.insert_submission("7", record.clone()).await,
            Err(AppError::InvalidTransition(_))
        ));
        // Another student is unaffected.
        store.insert_submission("8", record).await.unwrap();
        assert!(store.submission("exam-1", "7").await.is_some());
        assert!(store.submission("exam-1", "9").await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_course_and_id() {
        let store = ExamStore::new();
        store.insert_exam("course-9", exam(Duration::hours(1), 30)).await.unwrap();

        let by_course = store.exam_for_course("course-9").await.unwrap();
        assert_eq!(by_course.course_id.as_deref(), Some("course-9"));
        assert!(store.exam("exam-1").await.is_some());
        assert!(store.exam_for_course("course-1").await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_exam_id_across_courses_rejected() {
        let store = ExamStore::new();
        store.insert_exam("course-1", exam(Duration::hours(1), 30)).await.unwrap();

        let result = store.insert_exam("course-2", exam(Duration::hours(2), 45)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
        assert!(store.exam_for_course("course-2").await.is_none());
        assert_eq!(store.exam("exam-1").await.unwrap().course_id.as_deref(), Some("course-1"));

        // Re-registering under the same course replaces it.
        store.insert_exam("course-1", exam(Duration::hours(2), 45)).await.unwrap();
        assert_eq!(store.exam("exam-1").await.unwrap().duration_minutes, 45);
    }

    #[tokio::test]
    async fn test_invalid_exam_rejected() {
        let store = ExamStore::new();
        let mut bad = exam(Duration::hours(1), 30);
        bad.duration_minutes = 0;
        assert!(matches!(
            store.insert_exam("course-1", bad).await,
            Err(AppError::ValidationError(_))
        ));
    }
}
