// src/handlers/exam.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Duration;
use validator::Validate;

use crate::{
    clock::Clock,
    config::Config,
    error::AppError,
    models::{
        exam::ExamDefinition,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
    state::ExamStore,
    utils::jwt::Claims,
};

/// Returns the exam attached to a course, without its answer key.
pub async fn get_course_exam(
    State(store): State<ExamStore>,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let exam = store
        .exam_for_course(&course_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No exam for course '{}'", course_id)))?;

    Ok(Json(exam.to_public()))
}

/// Returns the caller's submission for an exam, or `null` if there is none.
pub async fn get_submission(
    State(store): State<ExamStore>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if store.exam(&exam_id).await.is_none() {
        return Err(AppError::NotFound(format!("Exam '{}' not found", exam_id)));
    }

    Ok(Json(store.submission(&exam_id, &claims.sub).await))
}

/// Records the caller's answers. Each student may submit once.
///
/// * Rejects answers to questions the exam does not have, or options the question does not offer.
/// * Rejects submissions later than the end date plus the configured grace period.
/// * Does not grade.
pub async fn submit_exam(
    State(store): State<ExamStore>,
    State(config): State<Config>,
    State(clock): State<Arc<dyn Clock>>,
    Extension(claims): Extension<Claims>,
    Path(exam_id): Path<String>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;

    let exam = store
        .exam(&exam_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Exam '{}' not found", exam_id)))?;

    check_answers(&exam, &req)?;

    let now = clock.now();
    if now > exam.end_date + Duration::seconds(config.submit_grace_secs) {
        return Err(AppError::ValidationError(format!(
            "Exam '{}' closed at {}",
            exam_id, exam.end_date
        )));
    }

    let record = SubmissionRecord {
        exam_id: exam.id.clone(),
        submitted_at: now,
        answers: req.answers,
    };
    let record = store.insert_submission(&claims.sub, record).await?;

    tracing::info!(
        exam_id = %record.exam_id,
        student = %claims.sub,
        answered = record.answers.len(),
        "Exam submission recorded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

fn check_answers(exam: &ExamDefinition, req: &SubmitExamRequest) -> Result<(), AppError> {
    for (question_id, option) in req.answers.iter() {
        let question = exam.question(question_id).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown question '{}'", question_id))
        })?;
        if !question.has_option(option) {
            return Err(AppError::ValidationError(format!(
                "'{}' is not an option of question '{}'",
                option, question_id
            )));
        }
    }
    Ok(())
}
