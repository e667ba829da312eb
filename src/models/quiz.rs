// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
/// Quizzes are never deleted, only hidden.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    #[sqlx(rename = "quiz_id")]
    pub id: i64,
    pub title: String,
    pub description: String,

    /// ID of the teacher who authored the quiz.
    pub created_by: i64,

    /// Optional display name of the author, shown next to the title.
    pub author_name: Option<String>,

    /// Hidden quizzes stay reviewable but reject new attempts.
    pub is_hidden: bool,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewQuiz {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub created_by: i64,
    #[validate(length(min = 1, max = 100))]
    pub author_name: Option<String>,
}

/// DTO for editing a quiz. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct QuizUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub hidden: bool,
}
