// src/handlers/review.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{error::AppError, models::review::StudentResultsQuery, state::AppState};

/// Completed attempts of a student, optionally limited to one teacher's quizzes.
pub async fn student_results(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Query(query): Query<StudentResultsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = match query.teacher_id {
        Some(teacher_id) => {
            state
                .review
                .attempts_for_student_by_teacher(student_id, teacher_id)
                .await?
        }
        None => state.review.attempts_for_student(student_id).await?,
    };

    Ok(Json(rows))
}

/// Completed attempts of every student at one quiz.
pub async fn quiz_results(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.review.attempts_for_quiz(quiz_id).await?;
    Ok(Json(rows))
}

pub async fn result_detail(
    State(state): State<AppState>,
    Path((quiz_id, attempt_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .review
        .result_detail(attempt_id, quiz_id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    Ok(Json(detail))
}
