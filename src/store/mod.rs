// src/store/mod.rs

//! Storage seams of the quiz core.
//!
//! Each component talks to its own trait so it can be handed any backend at
//! construction. `SqliteStore` implements all three over one pool.

pub mod sqlite;

use async_trait::async_trait;

use crate::{
    error::CoreResult,
    models::{
        attempt::{Attempt, AttemptSummary, OpenAttempt},
        question::{Choice, NewQuestion, Question},
        quiz::{NewQuiz, Quiz, QuizUpdate},
        response::{NewResponse, Response},
    },
};

pub use sqlite::SqliteStore;

/// Quizzes, questions and options.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn create_quiz(&self, quiz: &NewQuiz) -> CoreResult<i64>;

    /// Returns `false` if the quiz does not exist.
    async fn update_quiz(&self, quiz_id: i64, update: &QuizUpdate) -> CoreResult<bool>;

    /// Returns `false` if the quiz does not exist.
    async fn set_hidden(&self, quiz_id: i64, hidden: bool) -> CoreResult<bool>;

    /// Inserts the question and all of its options. `None` if the quiz does not exist.
    async fn add_question(&self, quiz_id: i64, question: &NewQuestion) -> CoreResult<Option<i64>>;

    async fn update_option_text(&self, option_id: i64, text: &str) -> CoreResult<bool>;

    /// Marks `option_id` as the only correct option of `question_id`.
    /// Returns `false` if the option does not belong to the question.
    async fn set_correct_option(&self, question_id: i64, option_id: i64) -> CoreResult<bool>;

    async fn get_quiz_by_id(&self, quiz_id: i64) -> CoreResult<Option<Quiz>>;

    /// `None` if the quiz does not exist.
    async fn is_hidden(&self, quiz_id: i64) -> CoreResult<Option<bool>>;

    async fn list_quizzes(&self, include_hidden: bool) -> CoreResult<Vec<Quiz>>;

    async fn list_quizzes_by_creator(&self, creator_id: i64) -> CoreResult<Vec<Quiz>>;

    /// Questions ordered by position.
    async fn get_questions_by_quiz(&self, quiz_id: i64) -> CoreResult<Vec<Question>>;

    /// Options ordered by position.
    async fn get_options_by_question(&self, question_id: i64) -> CoreResult<Vec<Choice>>;

    async fn count_questions(&self, quiz_id: i64) -> CoreResult<i64>;
}

/// Attempt lifecycle.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Check-and-insert of a pending attempt for the pair.
    ///
    /// Fails with `QuizNotFound` / `QuizHidden` when the quiz cannot be taken;
    /// visibility is checked in the same transaction as the insert.
    async fn open_attempt(&self, quiz_id: i64, student_id: i64) -> CoreResult<OpenAttempt>;

    async fn get_attempt(&self, attempt_id: i64) -> CoreResult<Option<Attempt>>;

    async fn has_completed(&self, quiz_id: i64, student_id: i64) -> CoreResult<bool>;

    /// Scores the attempt from its persisted responses and marks it completed,
    /// in one transaction. `None` if the attempt does not exist.
    async fn complete_attempt(&self, attempt_id: i64) -> CoreResult<Option<i64>>;

    /// Most recent completed attempt for the pair.
    async fn latest_completed(&self, quiz_id: i64, student_id: i64) -> CoreResult<Option<Attempt>>;

    /// Returns `false` if the attempt does not exist.
    async fn update_feedback(&self, attempt_id: i64, feedback: Option<&str>) -> CoreResult<bool>;

    /// Completed attempts of a student, newest first, optionally limited to
    /// quizzes authored by `teacher_id`.
    async fn completed_for_student(
        &self,
        student_id: i64,
        teacher_id: Option<i64>,
    ) -> CoreResult<Vec<AttemptSummary>>;

    /// Completed attempts at one quiz, newest first.
    async fn completed_for_quiz(&self, quiz_id: i64) -> CoreResult<Vec<AttemptSummary>>;
}

/// Submitted answers.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Writes the batch in one transaction and returns the number of rows written.
    async fn save_responses(&self, attempt_id: i64, responses: &[NewResponse]) -> CoreResult<u64>;

    /// Number of responses recorded as correct.
    async fn calculate_score(&self, attempt_id: i64) -> CoreResult<i64>;

    async fn get_response(&self, attempt_id: i64, question_id: i64) -> CoreResult<Option<Response>>;
}
