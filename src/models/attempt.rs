// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'quiz_attempts' table in the database.
/// One student's single pass at a quiz.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Attempt {
    #[sqlx(rename = "attempt_id")]
    pub id: i64,
    pub quiz_id: i64,
    #[sqlx(rename = "answered_by")]
    pub student_id: i64,

    /// Number of correct responses. Only meaningful once completed.
    pub score: i64,
    pub is_completed: bool,

    /// Free text left by the teacher.
    pub feedback: Option<String>,

    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of the check-and-insert performed when a student opens a quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAttempt {
    /// A fresh pending attempt was inserted.
    Created(i64),
    /// A pending attempt already existed and is handed back.
    Resumed(i64),
    /// The pair already has a completed attempt.
    Completed(i64),
}

/// Attempt handed to the caller after a successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartedAttempt {
    pub attempt_id: i64,
    pub resumed: bool,
}

/// Completed attempt joined with the title of its quiz.
#[derive(Debug, Clone, FromRow)]
pub struct AttemptSummary {
    pub attempt_id: i64,
    pub quiz_id: i64,
    #[sqlx(rename = "answered_by")]
    pub student_id: i64,
    pub quiz_title: String,
    pub score: i64,
    pub feedback: Option<String>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct StartAttemptRequest {
    pub student_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: Option<String>,
}
