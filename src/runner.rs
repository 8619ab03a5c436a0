// src/runner.rs

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, watch};

use crate::{
    backend::ExamBackend,
    clock::Clock,
    error::AppError,
    models::{answers::AnswerMap, submission::SubmissionRecord},
    session::{ExamSession, Phase},
    timer::Countdown,
};

/// Point-in-time view of a session, for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub exam_id: String,
    pub title: String,
    pub phase: Phase,
    pub remaining_millis: u64,
    pub question_count: usize,
    pub answers: AnswerMap,
}

/// Drives one exam-taking view: loads the exam, owns the session and its
/// countdown, and talks to the backend.
///
/// All methods take `&self`, so the runner can be shared between a UI loop
/// and the countdown. Dropping it cancels the countdown.
pub struct ExamRunner {
    backend: Arc<dyn ExamBackend>,
    clock: Arc<dyn Clock>,
    session: Arc<Mutex<ExamSession>>,
    countdown: Mutex<Option<Countdown>>,
    quantum: Duration,
}

impl ExamRunner {
    /// Fetches the course's exam and the student's prior submission, then
    /// initializes the session. Nothing is started.
    pub async fn load(
        backend: Arc<dyn ExamBackend>,
        clock: Arc<dyn Clock>,
        course_id: &str,
        quantum: Duration,
    ) -> Result<Self, AppError> {
        let exam = backend.fetch_exam_for_course(course_id).await?;
        let existing = backend.fetch_submission(&exam.id).await?;
        let session = ExamSession::initialize(exam, existing, clock.now());

        tracing::info!(
            course_id,
            exam_id = %session.exam().id,
            phase = ?session.phase(),
            "Exam session loaded"
        );

        Ok(Self {
            backend,
            clock,
            session: Arc::new(Mutex::new(session)),
            countdown: Mutex::new(None),
            quantum,
        })
    }

    /// Like `load`, but a course without an exam yields `Ok(None)`.
    pub async fn load_optional(
        backend: Arc<dyn ExamBackend>,
        clock: Arc<dyn Clock>,
        course_id: &str,
        quantum: Duration,
    ) -> Result<Option<Self>, AppError> {
        match Self::load(backend, clock, course_id, quantum).await {
            Ok(runner) => Ok(Some(runner)),
            Err(AppError::NotFound(msg)) => {
                tracing::info!(course_id, "No exam for course: {}", msg);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Starts the attempt and, if time is left, its countdown.
    pub async fn start(&self) -> Result<Phase, AppError> {
        let (phase, budget) = {
            let mut session = self.session.lock().await;
            let phase = session.start(self.clock.now())?;
            (phase, session.remaining_millis())
        };

        if phase == Phase::InProgress {
            let countdown = Countdown::spawn(self.session.clone(), self.quantum, budget);
            *self.countdown.lock().await = Some(countdown);
        }

        Ok(phase)
    }

    pub async fn answer(&self, question_id: &str, option: &str) -> Result<Option<String>, AppError> {
        self.session.lock().await.answer(question_id, option)
    }

    /// Submits the answers as they stood when this was called.
    ///
    /// The session lock is not held during the network call; answers and
    /// other submits are rejected until it returns.
    pub async fn submit(&self) -> Result<SubmissionRecord, AppError> {
        let (exam_id, request) = {
            let mut session = self.session.lock().await;
            let request = session.begin_submit()?;
            (session.exam().id.clone(), request)
        };

        let result = self.backend.submit_exam(&exam_id, &request).await;

        let record = self.session.lock().await.finish_submit(result)?;
        self.close().await;
        Ok(record)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            exam_id: session.exam().id.clone(),
            title: session.exam().title.clone(),
            phase: session.phase(),
            remaining_millis: session.remaining_millis(),
            question_count: session.exam().questions.len(),
            answers: session.answers().clone(),
        }
    }

    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }

    /// Remaining time feed, once the countdown is running.
    pub async fn remaining(&self) -> Option<watch::Receiver<u64>> {
        self.countdown.lock().await.as_ref().map(Countdown::remaining)
    }

    /// Releases the countdown. The session keeps its current state.
    pub async fn close(&self) {
        if let Some(countdown) = self.countdown.lock().await.take() {
            countdown.cancel();
        }
    }
}
