// src/store/sqlite.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::{
    error::{CoreError, CoreResult},
    models::{
        attempt::{Attempt, AttemptSummary, OpenAttempt},
        question::{Choice, NewQuestion, Question},
        quiz::{NewQuiz, Quiz, QuizUpdate},
        response::{NewResponse, Response},
    },
    store::{AttemptStore, CatalogStore, ResponseStore},
};

/// SQLite backend for every storage trait.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Counts the correct responses of an attempt on an existing connection, so
/// that completion can score inside its own transaction.
async fn count_correct(conn: &mut SqliteConnection, attempt_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM question_responses WHERE attempt_id = ? AND is_correct = 1",
    )
    .bind(attempt_id)
    .fetch_one(conn)
    .await
}

/// Finds the attempt row for a pair, preferring a completed one.
async fn find_attempt_for_pair(
    conn: &mut SqliteConnection,
    quiz_id: i64,
    student_id: i64,
) -> Result<Option<(i64, bool)>, sqlx::Error> {
    sqlx::query_as::<_, (i64, bool)>(
        r#"
        SELECT attempt_id, is_completed
        FROM quiz_attempts
        WHERE quiz_id = ? AND answered_by = ?
        ORDER BY is_completed DESC, attempt_id DESC
        LIMIT 1
        "#,
    )
    .bind(quiz_id)
    .bind(student_id)
    .fetch_optional(conn)
    .await
}

#[async_trait]
impl CatalogStore for SqliteStore {
    async fn create_quiz(&self, quiz: &NewQuiz) -> CoreResult<i64> {
        let id = sqlx::query(
            r#"
            INSERT INTO quizzes (title, description, created_by, author_name, is_hidden, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(quiz.title.as_str())
        .bind(quiz.description.as_str())
        .bind(quiz.created_by)
        .bind(quiz.author_name.as_deref())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn update_quiz(&self, quiz_id: i64, update: &QuizUpdate) -> CoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE quizzes SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                author_name = COALESCE(?, author_name)
            WHERE quiz_id = ?
            "#,
        )
        .bind(update.title.as_deref())
        .bind(update.description.as_deref())
        .bind(update.author_name.as_deref())
        .bind(quiz_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_hidden(&self, quiz_id: i64, hidden: bool) -> CoreResult<bool> {
        let result = sqlx::query("UPDATE quizzes SET is_hidden = ? WHERE quiz_id = ?")
            .bind(hidden)
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn add_question(&self, quiz_id: i64, question: &NewQuestion) -> CoreResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        // Appends at the end of the quiz. Inserts nothing if the quiz does not exist.
        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO questions (quiz_id, position, statement, explanation) \
             SELECT quiz_id, (SELECT COUNT(*) FROM questions WHERE quiz_id = ?1), ?2, ?3 \
             FROM quizzes WHERE quiz_id = ?1 \
             RETURNING question_id",
        )
        .bind(quiz_id)
        .bind(question.statement.as_str())
        .bind(question.explanation.as_deref())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(question_id) = inserted else {
            return Ok(None);
        };

        if !question.options.is_empty() {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "INSERT INTO question_options (question_id, position, option_text, is_correct) ",
            );
            builder.push_values(question.options.iter().enumerate(), |mut b, (i, opt)| {
                b.push_bind(question_id)
                    .push_bind(i as i64)
                    .push_bind(opt.text.as_str())
                    .push_bind(opt.is_correct);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        Ok(Some(question_id))
    }

    async fn update_option_text(&self, option_id: i64, text: &str) -> CoreResult<bool> {
        let result = sqlx::query("UPDATE question_options SET option_text = ? WHERE option_id = ?")
            .bind(text)
            .bind(option_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_correct_option(&self, question_id: i64, option_id: i64) -> CoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Flip every option of the question in one statement, but only if the
        // option actually belongs to it.
        let result = sqlx::query(
            r#"
            UPDATE question_options
            SET is_correct = CASE WHEN option_id = ?1 THEN 1 ELSE 0 END
            WHERE question_id = ?2
              AND EXISTS (SELECT 1 FROM question_options WHERE option_id = ?1 AND question_id = ?2)
            "#,
        )
        .bind(option_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_quiz_by_id(&self, quiz_id: i64) -> CoreResult<Option<Quiz>> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT quiz_id, title, description, created_by, author_name, is_hidden, created_at
            FROM quizzes
            WHERE quiz_id = ?
            "#,
        )
        .bind(quiz_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quiz)
    }

    async fn is_hidden(&self, quiz_id: i64) -> CoreResult<Option<bool>> {
        let hidden = sqlx::query_scalar::<_, bool>("SELECT is_hidden FROM quizzes WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(hidden)
    }

    async fn list_quizzes(&self, include_hidden: bool) -> CoreResult<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT quiz_id, title, description, created_by, author_name, is_hidden, created_at
            FROM quizzes
            WHERE ? OR is_hidden = 0
            ORDER BY quiz_id DESC
            "#,
        )
        .bind(include_hidden)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    async fn list_quizzes_by_creator(&self, creator_id: i64) -> CoreResult<Vec<Quiz>> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT quiz_id, title, description, created_by, author_name, is_hidden, created_at
            FROM quizzes
            WHERE created_by = ?
            ORDER BY quiz_id DESC
            "#,
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }

    async fn get_questions_by_quiz(&self, quiz_id: i64) -> CoreResult<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(
            r#"
            SELECT question_id, quiz_id, position, statement, explanation
            FROM questions
            WHERE quiz_id = ?
            ORDER BY position, question_id
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    async fn get_options_by_question(&self, question_id: i64) -> CoreResult<Vec<Choice>> {
        let options = sqlx::query_as::<_, Choice>(
            r#"
            SELECT option_id, question_id, position, option_text, is_correct
            FROM question_options
            WHERE question_id = ?
            ORDER BY position, option_id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(options)
    }

    async fn count_questions(&self, quiz_id: i64) -> CoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl AttemptStore for SqliteStore {
    async fn open_attempt(&self, quiz_id: i64, student_id: i64) -> CoreResult<OpenAttempt> {
        let mut tx = self.pool.begin().await?;

        // Write first so the transaction holds the write lock before it reads.
        // The unique index on (quiz_id, answered_by) turns a concurrent start
        // into a no-op insert, and the visibility guard sits in the same statement.
        let inserted = sqlx::query(
            "INSERT INTO quiz_attempts (quiz_id, answered_by, score, is_completed, started_at) \
             SELECT quiz_id, ?2, 0, 0, ?3 FROM quizzes WHERE quiz_id = ?1 AND is_hidden = 0 \
             ON CONFLICT (quiz_id, answered_by) DO NOTHING",
        )
        .bind(quiz_id)
        .bind(student_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 1 {
            let attempt_id = inserted.last_insert_rowid();
            tx.commit().await?;
            return Ok(OpenAttempt::Created(attempt_id));
        }

        let hidden = sqlx::query_scalar::<_, bool>("SELECT is_hidden FROM quizzes WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_optional(&mut *tx)
            .await?;

        let outcome = match hidden {
            None => return Err(CoreError::QuizNotFound(quiz_id)),
            Some(true) => return Err(CoreError::QuizHidden(quiz_id)),
            Some(false) => match find_attempt_for_pair(&mut tx, quiz_id, student_id).await? {
                Some((id, true)) => OpenAttempt::Completed(id),
                Some((id, false)) => OpenAttempt::Resumed(id),
                // The conflicting row vanished, which cannot happen since attempts are never deleted.
                None => return Err(sqlx::Error::RowNotFound.into()),
            },
        };

        tx.commit().await?;

        Ok(outcome)
    }

    async fn get_attempt(&self, attempt_id: i64) -> CoreResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT attempt_id, quiz_id, answered_by, score, is_completed, feedback, started_at, completed_at
            FROM quiz_attempts
            WHERE attempt_id = ?
            "#,
        )
        .bind(attempt_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn has_completed(&self, quiz_id: i64, student_id: i64) -> CoreResult<bool> {
        let completed = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS (SELECT 1 FROM quiz_attempts WHERE quiz_id = ? AND answered_by = ? AND is_completed = 1)",
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(completed == 1)
    }

    async fn complete_attempt(&self, attempt_id: i64) -> CoreResult<Option<i64>> {
        let mut tx = self.pool.begin().await?;

        // Keep the first completion time when completing again.
        let marked = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET is_completed = 1, completed_at = COALESCE(completed_at, ?)
            WHERE attempt_id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(attempt_id)
        .execute(&mut *tx)
        .await?;

        if marked.rows_affected() == 0 {
            return Ok(None);
        }

        let score = count_correct(&mut tx, attempt_id).await?;

        sqlx::query("UPDATE quiz_attempts SET score = ? WHERE attempt_id = ?")
            .bind(score)
            .bind(attempt_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(score))
    }

    async fn latest_completed(&self, quiz_id: i64, student_id: i64) -> CoreResult<Option<Attempt>> {
        let attempt = sqlx::query_as::<_, Attempt>(
            r#"
            SELECT attempt_id, quiz_id, answered_by, score, is_completed, feedback, started_at, completed_at
            FROM quiz_attempts
            WHERE quiz_id = ? AND answered_by = ? AND is_completed = 1
            ORDER BY attempt_id DESC
            LIMIT 1
            "#,
        )
        .bind(quiz_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn update_feedback(&self, attempt_id: i64, feedback: Option<&str>) -> CoreResult<bool> {
        let result = sqlx::query("UPDATE quiz_attempts SET feedback = ? WHERE attempt_id = ?")
            .bind(feedback)
            .bind(attempt_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn completed_for_student(
        &self,
        student_id: i64,
        teacher_id: Option<i64>,
    ) -> CoreResult<Vec<AttemptSummary>> {
        let rows = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT
                a.attempt_id,
                a.quiz_id,
                a.answered_by,
                q.title AS quiz_title,
                a.score,
                a.feedback,
                a.completed_at
            FROM quiz_attempts a
            JOIN quizzes q ON q.quiz_id = a.quiz_id
            WHERE a.answered_by = ?1
              AND a.is_completed = 1
              AND (?2 IS NULL OR q.created_by = ?2)
            ORDER BY a.attempt_id DESC
            "#,
        )
        .bind(student_id)
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn completed_for_quiz(&self, quiz_id: i64) -> CoreResult<Vec<AttemptSummary>> {
        let rows = sqlx::query_as::<_, AttemptSummary>(
            r#"
            SELECT
                a.attempt_id,
                a.quiz_id,
                a.answered_by,
                q.title AS quiz_title,
                a.score,
                a.feedback,
                a.completed_at
            FROM quiz_attempts a
            JOIN quizzes q ON q.quiz_id = a.quiz_id
            WHERE a.quiz_id = ? AND a.is_completed = 1
            ORDER BY a.attempt_id DESC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl ResponseStore for SqliteStore {
    async fn save_responses(&self, attempt_id: i64, responses: &[NewResponse]) -> CoreResult<u64> {
        if responses.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        let completed = sqlx::query_scalar::<_, bool>(
            "SELECT is_completed FROM quiz_attempts WHERE attempt_id = ?",
        )
        .bind(attempt_id)
        .fetch_optional(&mut *tx)
        .await?;

        match completed {
            None => return Err(CoreError::AttemptNotFound(attempt_id)),
            Some(true) => return Err(CoreError::AttemptCompleted(attempt_id)),
            Some(false) => {}
        }

        // Answering the same question again replaces the earlier choice.
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO question_responses (attempt_id, question_id, option_id, is_correct) ",
        );
        builder.push_values(responses, |mut b, r| {
            b.push_bind(attempt_id)
                .push_bind(r.question_id)
                .push_bind(r.option_id)
                .push_bind(r.is_correct);
        });
        builder.push(
            " ON CONFLICT (attempt_id, question_id) DO UPDATE SET \
             option_id = excluded.option_id, is_correct = excluded.is_correct",
        );

        let written = builder.build().execute(&mut *tx).await?.rows_affected();

        tx.commit().await?;

        Ok(written)
    }

    async fn calculate_score(&self, attempt_id: i64) -> CoreResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Ok(count_correct(&mut conn, attempt_id).await?)
    }

    async fn get_response(&self, attempt_id: i64, question_id: i64) -> CoreResult<Option<Response>> {
        let response = sqlx::query_as::<_, Response>(
            r#"
            SELECT response_id, attempt_id, question_id, option_id, is_correct
            FROM question_responses
            WHERE attempt_id = ? AND question_id = ?
            "#,
        )
        .bind(attempt_id)
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(response)
    }
}
