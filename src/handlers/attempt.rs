// src/handlers/attempt.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::{AppError, CoreError},
    models::{
        attempt::{FeedbackRequest, StartAttemptRequest},
        response::SubmitResponsesRequest,
        review::StudentQuizStatus,
    },
    state::AppState,
};

/// Starts (or resumes) a student's attempt and returns the paper to answer.
///
/// * Rejects hidden quizzes (403) and completed ones (409).
/// * Keeps the presented snapshot so answers are graded against it.
pub async fn start_attempt(
    State(state): State<AppState>,
    Path(quiz_id): Path<i64>,
    Json(req): Json<StartAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let started = state.ledger.start_attempt(quiz_id, req.student_id).await?;

    let snapshot = state
        .snapshots
        .get_or_load(started.attempt_id, quiz_id, &state.catalog)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let status = if started.resumed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((
        status,
        Json(serde_json::json!({
            "attempt_id": started.attempt_id,
            "resumed": started.resumed,
            "paper": snapshot.to_paper(),
        })),
    ))
}

/// Grades the submitted selections against the presented snapshot and saves them.
pub async fn submit_responses(
    State(state): State<AppState>,
    Path(attempt_id): Path<i64>,
    Json(req): Json<SubmitResponsesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.selections.is_empty() {
        return Err(AppError::BadRequest("Select at least one answer".to_string()));
    }

    let attempt = state
        .ledger
        .get_attempt(attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    if attempt.is_completed {
        state.snapshots.forget(attempt_id).await;
        return Err(AppError::Conflict("Attempt is already completed".to_string()));
    }

    let snapshot = state
        .snapshots
        .get_or_load(attempt_id, attempt.quiz_id, &state.catalog)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let responses = snapshot.grade(&req.selections)?;
    let saved = match state.recorder.save_responses(attempt_id, &responses).await {
        Ok(saved) => saved,
        Err(err) => {
            // A completion that landed after the check above; drop the reloaded snapshot again.
            if matches!(err, CoreError::AttemptCompleted(_)) {
                state.snapshots.forget(attempt_id).await;
            }
            return Err(err.into());
        }
    };

    Ok(Json(serde_json::json!({
        "attempt_id": attempt_id,
        "saved": saved,
        "total_questions": snapshot.question_count(),
    })))
}

/// Ends the attempt and returns its final score.
pub async fn complete_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let score = state
        .ledger
        .end_attempt(attempt_id)
        .await?
        .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    state.snapshots.forget(attempt_id).await;

    Ok(Json(serde_json::json!({
        "attempt_id": attempt_id,
        "score": score,
        "message": "Quiz submitted successfully"
    })))
}

/// Attaches teacher feedback to an attempt.
pub async fn update_feedback(
    State(state): State<AppState>,
    Path(attempt_id): Path<i64>,
    Json(req): Json<FeedbackRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !state
        .ledger
        .update_feedback(attempt_id, req.feedback.as_deref())
        .await?
    {
        return Err(AppError::NotFound("Attempt not found".to_string()));
    }

    Ok(StatusCode::OK)
}

/// Whether a student has completed a quiz, and with which score.
pub async fn student_status(
    State(state): State<AppState>,
    Path((quiz_id, student_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let completed = state.ledger.has_completed(quiz_id, student_id).await?;
    let score = state.ledger.get_score(quiz_id, student_id).await?;
    let attempt_id = state.ledger.get_attempt_id(quiz_id, student_id).await?;

    Ok(Json(StudentQuizStatus {
        quiz_id,
        student_id,
        completed,
        score,
        attempt_id,
    }))
}
