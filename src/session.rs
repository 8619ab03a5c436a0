// src/session.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    backend::ExamBackend,
    error::AppError,
    models::{
        answers::AnswerMap,
        exam::ExamDefinition,
        submission::{SubmissionRecord, SubmitExamRequest},
    },
};

/// Lifecycle of one attempt at a timed exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NotStarted,
    InProgress,
    /// Out of time. Answers are frozen but the attempt can still be submitted.
    Expired,
    Submitted,
    /// The backend already holds a submission from this student.
    AlreadySubmitted,
}

impl Phase {
    /// No operation can leave a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Submitted | Phase::AlreadySubmitted)
    }

    pub fn can_submit(self) -> bool {
        matches!(self, Phase::InProgress | Phase::Expired)
    }
}

/// Client-side rules of a timed exam attempt, independent of rendering.
///
/// Owns the phase, the countdown value and the answers. Time only moves
/// through `tick`, so the session can be driven by a real interval or by a test.
#[derive(Debug, Clone)]
pub struct ExamSession {
    exam: ExamDefinition,
    phase: Phase,
    remaining_millis: u64,
    answers: AnswerMap,
    submission: Option<SubmissionRecord>,
    submitting: bool,
}

impl ExamSession {
    /// Builds the session for a freshly loaded exam view.
    ///
    /// A prior submission wins over everything else and is final.
    pub fn initialize(
        exam: ExamDefinition,
        existing_submission: Option<SubmissionRecord>,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(record) = existing_submission {
            tracing::info!(exam_id = %exam.id, "Exam already submitted at {}", record.submitted_at);
            return Self {
                answers: record.answers.clone(),
                submission: Some(record),
                phase: Phase::AlreadySubmitted,
                remaining_millis: 0,
                submitting: false,
                exam,
            };
        }

        let (phase, remaining_millis) = if exam.has_ended(now) {
            tracing::info!(exam_id = %exam.id, "Exam closed at {}", exam.end_date);
            (Phase::Expired, 0)
        } else {
            (Phase::NotStarted, exam.millis_until_end(now) as u64)
        };

        Self {
            exam,
            phase,
            remaining_millis,
            answers: AnswerMap::new(),
            submission: None,
            submitting: false,
        }
    }

    /// Countdown budget for an attempt started at `now`: the tighter of the
    /// per-attempt duration and the time left before the hard close.
    pub fn budget_millis(exam: &ExamDefinition, now: DateTime<Utc>) -> i64 {
        exam.millis_until_end(now).min(exam.duration_millis())
    }

    /// Starts the attempt. Only valid from `NotStarted`.
    ///
    /// Returns the resulting phase: `InProgress`, or `Expired` when no time is left.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<Phase, AppError> {
        if self.phase != Phase::NotStarted {
            tracing::warn!(exam_id = %self.exam.id, phase = ?self.phase, "Rejected start");
            return Err(AppError::InvalidTransition(format!(
                "Cannot start exam in phase {:?}",
                self.phase
            )));
        }

        let budget = Self::budget_millis(&self.exam, now);
        if budget <= 0 {
            self.phase = Phase::Expired;
            self.remaining_millis = 0;
            tracing::info!(exam_id = %self.exam.id, "Exam started with no time left; expired");
        } else {
            self.phase = Phase::InProgress;
            self.remaining_millis = budget as u64;
            tracing::info!(exam_id = %self.exam.id, budget_ms = budget, "Exam started");
        }

        Ok(self.phase)
    }

    /// Selects `option` for `question_id`, replacing any earlier selection.
    ///
    /// Returns the replaced option. Only valid while `InProgress` and not
    /// submitting; the question and option must belong to the exam.
    pub fn answer(&mut self, question_id: &str, option: &str) -> Result<Option<String>, AppError> {
        if self.phase != Phase::InProgress || self.submitting {
            tracing::warn!(
                exam_id = %self.exam.id,
                phase = ?self.phase,
                submitting = self.submitting,
                "Rejected answer for {}",
                question_id
            );
            return Err(AppError::InvalidTransition(format!(
                "Cannot answer in phase {:?}",
                self.phase
            )));
        }

        let question = self.exam.question(question_id).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown question '{}'", question_id))
        })?;
        if !question.has_option(option) {
            return Err(AppError::ValidationError(format!(
                "'{}' is not an option of question '{}'",
                option, question_id
            )));
        }

        Ok(self.answers.select(question_id, option))
    }

    /// Advances the countdown by `elapsed`. Outside `InProgress` this does nothing.
    ///
    /// Reaching zero moves the session to `Expired` in the same call, so no
    /// caller ever sees `InProgress` with zero time left.
    pub fn tick(&mut self, elapsed: Duration) -> Phase {
        if self.phase != Phase::InProgress {
            return self.phase;
        }

        let elapsed = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.remaining_millis = self.remaining_millis.saturating_sub(elapsed);
        if self.remaining_millis == 0 {
            self.phase = Phase::Expired;
            tracing::info!(exam_id = %self.exam.id, answered = self.answers.len(), "Exam time expired");
        }

        self.phase
    }

    /// Submits the answers through `backend`.
    ///
    /// Rejected locally (no network call) unless the phase is `InProgress` or
    /// `Expired`. A backend failure leaves the phase untouched so the caller
    /// can retry.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<SubmissionRecord, AppError>
    where
        B: ExamBackend + ?Sized,
    {
        let request = self.begin_submit()?;
        let result = backend.submit_exam(&self.exam.id, &request).await;
        self.finish_submit(result)
    }

    /// Freezes the answers and returns the payload to send.
    ///
    /// Until `finish_submit` is called, `answer` and further submits are rejected.
    pub fn begin_submit(&mut self) -> Result<SubmitExamRequest, AppError> {
        if self.phase.is_terminal() {
            tracing::warn!(exam_id = %self.exam.id, phase = ?self.phase, "Rejected repeat submit");
            return Err(AppError::InvalidTransition(format!(
                "Exam already submitted ({:?})",
                self.phase
            )));
        }
        if !self.phase.can_submit() {
            tracing::warn!(exam_id = %self.exam.id, phase = ?self.phase, "Rejected submit");
            return Err(AppError::InvalidTransition(format!(
                "Cannot submit exam in phase {:?}",
                self.phase
            )));
        }
        if self.submitting {
            return Err(AppError::InvalidTransition(
                "A submission is already in flight".to_string(),
            ));
        }

        self.submitting = true;
        Ok(SubmitExamRequest {
            answers: self.answers.clone(),
        })
    }

    /// Applies the backend's answer to a submission started with `begin_submit`.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmissionRecord, AppError>,
    ) -> Result<SubmissionRecord, AppError> {
        if !self.submitting || self.phase.is_terminal() {
            tracing::warn!(exam_id = %self.exam.id, phase = ?self.phase, "Rejected submit result");
            return Err(AppError::InvalidTransition(format!(
                "No submission in flight in phase {:?}",
                self.phase
            )));
        }
        self.submitting = false;

        match result {
            Ok(record) => {
                self.phase = Phase::Submitted;
                self.submission = Some(record.clone());
                tracing::info!(exam_id = %self.exam.id, answered = record.answers.len(), "Exam submitted");
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(exam_id = %self.exam.id, phase = ?self.phase, "Submit failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_millis(&self) -> u64 {
        self.remaining_millis
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_millis)
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn exam(&self) -> &ExamDefinition {
        &self.exam
    }

    /// The backend's record, once the exam is submitted (now or earlier).
    pub fn submission(&self) -> Option<&SubmissionRecord> {
        self.submission.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}
