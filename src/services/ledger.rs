// src/services/ledger.rs

use std::sync::Arc;

use crate::{
    error::{CoreError, CoreResult},
    models::attempt::{Attempt, OpenAttempt, StartedAttempt},
    store::AttemptStore,
};

/// Owns the lifecycle of an attempt: `Pending --end--> Completed`.
///
/// A (quiz, student) pair has at most one attempt. Starting again while it is
/// pending hands back the same attempt; once it is completed only review is
/// possible.
#[derive(Clone)]
pub struct AttemptLedger {
    attempts: Arc<dyn AttemptStore>,
}

impl AttemptLedger {
    pub fn new(attempts: Arc<dyn AttemptStore>) -> Self {
        Self { attempts }
    }

    /// Opens an attempt for the student.
    ///
    /// * Fails with `QuizNotFound` / `QuizHidden` if the quiz cannot be taken.
    /// * Fails with `AlreadyCompleted` if the student already finished it.
    /// * Returns the pending attempt (flagged `resumed`) if one exists.
    pub async fn start_attempt(&self, quiz_id: i64, student_id: i64) -> CoreResult<StartedAttempt> {
        let opened = match self.attempts.open_attempt(quiz_id, student_id).await {
            Err(CoreError::QuizHidden(_)) => {
                tracing::warn!(quiz_id, student_id, "Rejected attempt on hidden quiz");
                return Err(CoreError::QuizHidden(quiz_id));
            }
            other => other?,
        };

        match opened {
            OpenAttempt::Created(attempt_id) => {
                tracing::info!(attempt_id, quiz_id, student_id, "Attempt started");
                Ok(StartedAttempt {
                    attempt_id,
                    resumed: false,
                })
            }
            OpenAttempt::Resumed(attempt_id) => {
                tracing::info!(attempt_id, quiz_id, student_id, "Pending attempt resumed");
                Ok(StartedAttempt {
                    attempt_id,
                    resumed: true,
                })
            }
            OpenAttempt::Completed(attempt_id) => {
                tracing::warn!(attempt_id, quiz_id, student_id, "Rejected retake of completed quiz");
                Err(CoreError::AlreadyCompleted { quiz_id, student_id })
            }
        }
    }

    pub async fn has_completed(&self, quiz_id: i64, student_id: i64) -> CoreResult<bool> {
        self.attempts.has_completed(quiz_id, student_id).await
    }

    /// Scores the attempt from its recorded responses and marks it completed.
    ///
    /// Returns the score, or `None` if the attempt does not exist. Ending an
    /// attempt again rescores it from the same responses.
    pub async fn end_attempt(&self, attempt_id: i64) -> CoreResult<Option<i64>> {
        let score = self.attempts.complete_attempt(attempt_id).await?;
        match score {
            Some(score) => tracing::info!(attempt_id, score, "Attempt completed"),
            None => tracing::warn!(attempt_id, "Ignored completion of unknown attempt"),
        }
        Ok(score)
    }

    /// Score of the authoritative (most recent completed) attempt.
    pub async fn get_score(&self, quiz_id: i64, student_id: i64) -> CoreResult<Option<i64>> {
        Ok(self
            .attempts
            .latest_completed(quiz_id, student_id)
            .await?
            .map(|attempt| attempt.score))
    }

    /// ID of the authoritative (most recent completed) attempt.
    pub async fn get_attempt_id(&self, quiz_id: i64, student_id: i64) -> CoreResult<Option<i64>> {
        Ok(self
            .attempts
            .latest_completed(quiz_id, student_id)
            .await?
            .map(|attempt| attempt.id))
    }

    pub async fn get_attempt(&self, attempt_id: i64) -> CoreResult<Option<Attempt>> {
        self.attempts.get_attempt(attempt_id).await
    }

    /// Attaches teacher feedback. Returns `false` if the attempt does not exist.
    pub async fn update_feedback(&self, attempt_id: i64, feedback: Option<&str>) -> CoreResult<bool> {
        let found = self.attempts.update_feedback(attempt_id, feedback).await?;
        if !found {
            tracing::warn!(attempt_id, "Feedback for unknown attempt");
        }
        Ok(found)
    }
}
