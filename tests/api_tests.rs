// tests/api_tests.rs

use quizroom::{config::Config, routes, state::AppState};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with_state().await.0
}

/// Same as `spawn_app`, but also hands back the state the server runs on.
async fn spawn_app_with_state() -> (String, AppState) {
    // 1. Create an in-memory pool (one connection, so every request sees the same database)
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        max_connections: 1,
        snapshot_ttl: std::time::Duration::from_secs(3600),
    };

    let state = AppState::new(pool, &config);

    // 4. Create the router with the app state
    let app = routes::create_router(state.clone());

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, state)
}

/// Creates a quiz with three 4-option questions; the first option is correct.
async fn create_algebra_quiz(client: &reqwest::Client, address: &str) -> i64 {
    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&json!({
            "title": "Algebra",
            "description": "Linear equations",
            "created_by": 1,
            "author_name": "Mr. Noether"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);
    let quiz_id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    for i in 1..=3 {
        let response = client
            .post(format!("{}/api/quizzes/{}/questions", address, quiz_id))
            .json(&json!({
                "statement": format!("Solve equation {}", i),
                "explanation": "Isolate x",
                "options": [
                    { "text": "x = 1", "is_correct": true },
                    { "text": "x = 2" },
                    { "text": "x = 3" },
                    { "text": "x = 4" }
                ]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    quiz_id
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn create_quiz_fails_validation() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&json!({ "title": "", "created_by": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // A question needs exactly one correct option.
    let quiz_id = create_algebra_quiz(&client, &address).await;
    let response = client
        .post(format!("{}/api/quizzes/{}/questions", address, quiz_id))
        .json(&json!({
            "statement": "Two answers?",
            "options": [
                { "text": "a", "is_correct": true },
                { "text": "b", "is_correct": true }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn test_attempt_flow() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_algebra_quiz(&client, &address).await;

    // 1. Start the attempt and receive the paper
    let response = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    let attempt_id = body["attempt_id"].as_i64().unwrap();
    let questions = body["paper"]["questions"].as_array().unwrap().clone();
    assert_eq!(questions.len(), 3);
    assert!(!body.to_string().contains("is_correct"));

    // Starting again while pending resumes the same attempt
    let response = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["attempt_id"].as_i64().unwrap(), attempt_id);
    assert_eq!(body["resumed"], true);

    // 2. Empty submission is rejected
    let response = client
        .post(format!("{}/api/attempts/{}/responses", address, attempt_id))
        .json(&json!({ "selections": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // 3. Answer Q1 right (first option), Q2 wrong (second option), skip Q3
    let selections = json!({
        "selections": [
            {
                "question_id": questions[0]["question_id"],
                "option_id": questions[0]["options"][0]["option_id"]
            },
            {
                "question_id": questions[1]["question_id"],
                "option_id": questions[1]["options"][1]["option_id"]
            }
        ]
    });
    let response = client
        .post(format!("{}/api/attempts/{}/responses", address, attempt_id))
        .json(&selections)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["saved"], 2);

    // 4. Complete
    let response = client
        .post(format!("{}/api/attempts/{}/complete", address, attempt_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["score"], 1);

    // 5. No retake
    let response = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // 6. Status
    let status: Value = client
        .get(format!("{}/api/quizzes/{}/students/42", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["completed"], true);
    assert_eq!(status["score"], 1);
    assert_eq!(status["attempt_id"].as_i64().unwrap(), attempt_id);

    // 7. Teacher feedback and student results
    let response = client
        .put(format!("{}/api/attempts/{}/feedback", address, attempt_id))
        .json(&json!({ "feedback": "Check question 2" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let rows: Value = client
        .get(format!("{}/api/students/42/results?teacher_id=1", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["score"], 1);
    assert_eq!(rows[0]["total"], 3);
    assert_eq!(rows[0]["feedback"], "Check question 2");

    let rows: Value = client
        .get(format!("{}/api/students/42/results?teacher_id=2", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(rows.as_array().unwrap().is_empty());

    // 8. Detail
    let detail: Value = client
        .get(format!("{}/api/quizzes/{}/attempts/{}", address, quiz_id, attempt_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let detail_questions = detail["questions"].as_array().unwrap();
    assert_eq!(detail_questions.len(), 3);
    assert_eq!(detail_questions[0]["recorded_correct"], true);
    assert_eq!(detail_questions[1]["recorded_correct"], false);
    assert!(detail_questions[2]["chosen_option_id"].is_null());
}

#[tokio::test]
async fn test_hidden_quiz_is_forbidden() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_algebra_quiz(&client, &address).await;

    let response = client
        .put(format!("{}/api/quizzes/{}/visibility", address, quiz_id))
        .json(&json!({ "hidden": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Hidden quizzes drop out of the default listing
    let quizzes: Value = client
        .get(format!("{}/api/quizzes", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(quizzes.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_attempt_is_404() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/attempts/999/complete", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .post(format!("{}/api/attempts/999/responses", address))
        .json(&json!({ "selections": [{ "question_id": 1, "option_id": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn test_answers_graded_against_presented_quiz() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let quiz_id = create_algebra_quiz(&client, &address).await;

    let body: Value = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let attempt_id = body["attempt_id"].as_i64().unwrap();
    let question = body["paper"]["questions"][0].clone();
    let question_id = question["question_id"].as_i64().unwrap();
    let presented_correct = question["options"][0]["option_id"].clone();
    let new_correct = question["options"][1]["option_id"].clone();

    // The teacher moves the correct mark while the student is answering
    let response = client
        .put(format!("{}/api/questions/{}/correct", address, question_id))
        .json(&json!({ "option_id": new_correct }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/attempts/{}/responses", address, attempt_id))
        .json(&json!({
            "selections": [{ "question_id": question_id, "option_id": presented_correct }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = client
        .post(format!("{}/api/attempts/{}/complete", address, attempt_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["score"], 1);
}

#[tokio::test]
async fn test_submit_to_completed_attempt_drops_snapshot() {
    let (address, state) = spawn_app_with_state().await;
    let client = reqwest::Client::new();
    let quiz_id = create_algebra_quiz(&client, &address).await;

    let body: Value = client
        .post(format!("{}/api/quizzes/{}/attempts", address, quiz_id))
        .json(&json!({ "student_id": 42 }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let attempt_id = body["attempt_id"].as_i64().unwrap();
    let question = body["paper"]["questions"][0].clone();
    assert!(state.snapshots.get(attempt_id).await.is_some());

    // Completed behind the HTTP layer's back, so the cached snapshot is left over
    state.ledger.end_attempt(attempt_id).await.unwrap();

    let response = client
        .post(format!("{}/api/attempts/{}/responses", address, attempt_id))
        .json(&json!({
            "selections": [{
                "question_id": question["question_id"],
                "option_id": question["options"][0]["option_id"]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    assert!(state.snapshots.get(attempt_id).await.is_none());
}
