// src/services/review.rs

use std::{collections::HashMap, sync::Arc};

use crate::{
    error::{CoreError, CoreResult},
    models::{
        attempt::AttemptSummary,
        review::{OptionReview, QuestionReview, ResultDetail, ReviewRow},
    },
    services::{catalog::Catalog, recorder::ResponseRecorder},
    store::AttemptStore,
};

/// Rebuilds completed attempts for review.
///
/// Scores are the ones frozen at completion. The per-question detail marks
/// correct options from the current catalog, and reports the correctness that
/// was recorded at submission next to it, so an edited quiz shows up as
/// `content_changed` instead of silently disagreeing with the score.
#[derive(Clone)]
pub struct ReviewAggregator {
    catalog: Catalog,
    attempts: Arc<dyn AttemptStore>,
    recorder: ResponseRecorder,
}

impl ReviewAggregator {
    pub fn new(catalog: Catalog, attempts: Arc<dyn AttemptStore>, recorder: ResponseRecorder) -> Self {
        Self {
            catalog,
            attempts,
            recorder,
        }
    }

    pub async fn attempts_for_student(&self, student_id: i64) -> CoreResult<Vec<ReviewRow>> {
        let summaries = self.attempts.completed_for_student(student_id, None).await?;
        self.with_totals(summaries).await
    }

    /// Same as `attempts_for_student`, limited to quizzes authored by `teacher_id`.
    pub async fn attempts_for_student_by_teacher(
        &self,
        student_id: i64,
        teacher_id: i64,
    ) -> CoreResult<Vec<ReviewRow>> {
        let summaries = self
            .attempts
            .completed_for_student(student_id, Some(teacher_id))
            .await?;
        self.with_totals(summaries).await
    }

    pub async fn attempts_for_quiz(&self, quiz_id: i64) -> CoreResult<Vec<ReviewRow>> {
        let summaries = self.attempts.completed_for_quiz(quiz_id).await?;
        self.with_totals(summaries).await
    }

    /// `total` is the number of questions in the quiz, not the number answered.
    async fn with_totals(&self, summaries: Vec<AttemptSummary>) -> CoreResult<Vec<ReviewRow>> {
        let mut totals: HashMap<i64, i64> = HashMap::new();
        let mut rows = Vec::with_capacity(summaries.len());

        for summary in summaries {
            let total = match totals.get(&summary.quiz_id) {
                Some(total) => *total,
                None => {
                    let total = self.catalog.count_questions(summary.quiz_id).await?;
                    totals.insert(summary.quiz_id, total);
                    total
                }
            };
            rows.push(ReviewRow::from_summary(summary, total));
        }

        Ok(rows)
    }

    /// Per-question review of a completed attempt.
    ///
    /// `None` if the attempt or quiz does not exist, or the attempt belongs to
    /// another quiz. A pending attempt is an `AttemptNotCompleted` error.
    pub async fn result_detail(&self, attempt_id: i64, quiz_id: i64) -> CoreResult<Option<ResultDetail>> {
        let Some(attempt) = self.attempts.get_attempt(attempt_id).await? else {
            return Ok(None);
        };
        if attempt.quiz_id != quiz_id {
            tracing::warn!(attempt_id, quiz_id, actual_quiz_id = attempt.quiz_id, "Attempt belongs to another quiz");
            return Ok(None);
        }
        if !attempt.is_completed {
            return Err(CoreError::AttemptNotCompleted(attempt_id));
        }

        let Some(snapshot) = self.catalog.load_snapshot(quiz_id).await? else {
            return Ok(None);
        };

        let mut questions = Vec::with_capacity(snapshot.questions.len());
        for entry in snapshot.questions {
            let response = self.recorder.get_response(attempt_id, entry.question.id).await?;
            let chosen_option_id = response.as_ref().map(|r| r.option_id);
            let recorded_correct = response.as_ref().map(|r| r.is_correct);

            let correct_option_ids: Vec<i64> = entry
                .options
                .iter()
                .filter(|o| o.is_correct)
                .map(|o| o.id)
                .collect();

            let content_changed = match (chosen_option_id, recorded_correct) {
                (Some(chosen), Some(recorded)) => correct_option_ids.contains(&chosen) != recorded,
                _ => false,
            };

            let options = entry
                .options
                .into_iter()
                .map(|o| OptionReview {
                    chosen: Some(o.id) == chosen_option_id,
                    option_id: o.id,
                    text: o.text,
                    is_correct: o.is_correct,
                })
                .collect();

            questions.push(QuestionReview {
                question_id: entry.question.id,
                statement: entry.question.statement,
                explanation: entry.question.explanation,
                options,
                chosen_option_id,
                correct_option_ids,
                recorded_correct,
                content_changed,
            });
        }

        Ok(Some(ResultDetail {
            attempt_id,
            quiz_id,
            student_id: attempt.student_id,
            quiz_title: snapshot.quiz.title,
            score: attempt.score,
            total: questions.len() as i64,
            feedback: attempt.feedback,
            questions,
        }))
    }
}
