// src/models/exam.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{PublicQuestion, Question};

/// A timed multiple-choice exam attached to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExamDefinition {
    #[validate(length(min = 1, max = 64))]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub start_date: DateTime<Utc>,

    /// Hard close time. No attempt may run past it.
    pub end_date: DateTime<Utc>,

    /// Per-attempt time limit.
    #[validate(range(min = 1))]
    pub duration_minutes: u32,

    #[validate(nested)]
    pub questions: Vec<Question>,
}

impl ExamDefinition {
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn duration_millis(&self) -> i64 {
        i64::from(self.duration_minutes) * 60_000
    }

    /// Milliseconds from `now` until the hard close. Negative once closed.
    pub fn millis_until_end(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date - now).num_milliseconds()
    }

    /// Closed from `end_date` on: at that instant no time is left to start with.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_date
    }

    /// Copy of this exam safe to hand to a test-taker.
    pub fn to_public(&self) -> PublicExam {
        PublicExam {
            id: self.id.clone(),
            course_id: self.course_id.clone(),
            title: self.title.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            duration_minutes: self.duration_minutes,
            questions: self.questions.iter().map(Question::to_public).collect(),
        }
    }
}

/// DTO for returning an exam to the client (answer keys removed).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExam {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration_minutes: u32,
    pub questions: Vec<PublicQuestion>,
}
