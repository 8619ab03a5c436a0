// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::answers::AnswerMap;

/// A student's recorded attempt at an exam, as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    #[serde(default)]
    pub exam_id: String,
    pub submitted_at: DateTime<Utc>,
    pub answers: AnswerMap,
}

/// DTO for submitting an exam attempt.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitExamRequest {
    /// User's answers map.
    /// Key: Question ID
    /// Value: User's selected option
    #[validate(custom(function = validate_answers))]
    pub answers: AnswerMap,
}

fn validate_answers(answers: &AnswerMap) -> Result<(), validator::ValidationError> {
    for (question_id, option) in answers.iter() {
        if question_id.is_empty() || question_id.len() > 64 {
            return Err(validator::ValidationError::new("question_id_length_out_of_range"));
        }
        if option.is_empty() || option.len() > 500 {
            return Err(validator::ValidationError::new("option_length_out_of_range"));
        }
    }
    Ok(())
}
