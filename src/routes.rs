// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{attempt, quiz, review},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quizzes, attempts, students).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (the quiz core components).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route("/{quiz_id}", get(quiz::get_quiz).put(quiz::update_quiz))
        .route("/{quiz_id}/visibility", put(quiz::set_visibility))
        .route("/{quiz_id}/questions", post(quiz::add_question))
        .route("/{quiz_id}/attempts", post(attempt::start_attempt))
        .route("/{quiz_id}/attempts/{attempt_id}", get(review::result_detail))
        .route("/{quiz_id}/results", get(review::quiz_results))
        .route("/{quiz_id}/students/{student_id}", get(attempt::student_status));

    let catalog_routes = Router::new()
        .route("/api/options/{option_id}", put(quiz::update_option))
        .route("/api/questions/{question_id}/correct", put(quiz::set_correct_option));

    let attempt_routes = Router::new()
        .route("/{attempt_id}/responses", post(attempt::submit_responses))
        .route("/{attempt_id}/complete", post(attempt::complete_attempt))
        .route("/{attempt_id}/feedback", put(attempt::update_feedback));

    let student_routes = Router::new().route("/{student_id}/results", get(review::student_results));

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .merge(catalog_routes)
        .nest("/api/attempts", attempt_routes)
        .nest("/api/students", student_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
