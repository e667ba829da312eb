// src/models/response.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'question_responses' table in the database.
///
/// `is_correct` is captured when the response is submitted and is never
/// re-derived from the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Response {
    #[sqlx(rename = "response_id")]
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub option_id: i64,
    pub is_correct: bool,
}

/// A graded answer, ready to be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewResponse {
    pub question_id: i64,
    pub option_id: i64,
    pub is_correct: bool,
}

/// The option a student picked for one question, as sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Selection {
    pub question_id: i64,
    pub option_id: i64,
}

/// DTO for submitting answers to a pending attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitResponsesRequest {
    pub selections: Vec<Selection>,
}
