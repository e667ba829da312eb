// src/models/review.rs

use serde::{Deserialize, Serialize};

use crate::models::attempt::AttemptSummary;

/// One line of a results listing: a completed attempt scored out of the
/// number of questions currently in its quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub quiz_title: String,
    pub score: i64,
    pub total: i64,
    pub feedback: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl ReviewRow {
    pub fn from_summary(summary: AttemptSummary, total: i64) -> Self {
        Self {
            attempt_id: summary.attempt_id,
            quiz_id: summary.quiz_id,
            student_id: summary.student_id,
            quiz_title: summary.quiz_title,
            score: summary.score,
            total,
            feedback: summary.feedback,
            completed_at: summary.completed_at,
        }
    }
}

/// Full review of one completed attempt.
#[derive(Debug, Clone, Serialize)]
pub struct ResultDetail {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub quiz_title: String,
    pub score: i64,
    pub total: i64,
    pub feedback: Option<String>,
    pub questions: Vec<QuestionReview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub question_id: i64,
    pub statement: String,
    pub explanation: Option<String>,
    pub options: Vec<OptionReview>,

    /// `None` when the question was left unanswered.
    pub chosen_option_id: Option<i64>,

    /// Options marked correct in the current catalog.
    pub correct_option_ids: Vec<i64>,

    /// Correctness frozen when the answer was submitted. This is what the score counts.
    pub recorded_correct: Option<bool>,

    /// Set when the current catalog disagrees with `recorded_correct`,
    /// i.e. the quiz was edited after the attempt.
    pub content_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionReview {
    pub option_id: i64,
    pub text: String,
    pub is_correct: bool,
    pub chosen: bool,
}

/// Query for `/students/{id}/results`.
#[derive(Debug, Deserialize)]
pub struct StudentResultsQuery {
    pub teacher_id: Option<i64>,
}

/// Completion status of a student on one quiz.
#[derive(Debug, Serialize)]
pub struct StudentQuizStatus {
    pub quiz_id: i64,
    pub student_id: i64,
    pub completed: bool,
    pub score: Option<i64>,
    pub attempt_id: Option<i64>,
}
