// src/services/catalog.rs

use std::sync::Arc;

use crate::{
    error::CoreResult,
    models::{
        question::{Choice, NewQuestion, Question},
        quiz::{NewQuiz, Quiz, QuizUpdate},
        snapshot::{QuizSnapshot, SnapshotQuestion},
    },
    store::CatalogStore,
};

/// Quiz authoring and lookup.
///
/// Input validation is the caller's job (the DTOs derive `Validate`); this
/// layer only talks to storage and logs what changed.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn CatalogStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn create_quiz(&self, quiz: &NewQuiz) -> CoreResult<i64> {
        let id = self.store.create_quiz(quiz).await?;
        tracing::info!(quiz_id = id, created_by = quiz.created_by, "Quiz created");
        Ok(id)
    }

    pub async fn update_quiz(&self, quiz_id: i64, update: &QuizUpdate) -> CoreResult<bool> {
        self.store.update_quiz(quiz_id, update).await
    }

    pub async fn set_hidden(&self, quiz_id: i64, hidden: bool) -> CoreResult<bool> {
        let found = self.store.set_hidden(quiz_id, hidden).await?;
        if found {
            tracing::info!(quiz_id, hidden, "Quiz visibility changed");
        }
        Ok(found)
    }

    pub async fn add_question(&self, quiz_id: i64, question: &NewQuestion) -> CoreResult<Option<i64>> {
        self.store.add_question(quiz_id, question).await
    }

    pub async fn update_option_text(&self, option_id: i64, text: &str) -> CoreResult<bool> {
        self.store.update_option_text(option_id, text).await
    }

    pub async fn set_correct_option(&self, question_id: i64, option_id: i64) -> CoreResult<bool> {
        let changed = self.store.set_correct_option(question_id, option_id).await?;
        if changed {
            tracing::info!(question_id, option_id, "Correct option changed");
        }
        Ok(changed)
    }

    pub async fn get_quiz_by_id(&self, quiz_id: i64) -> CoreResult<Option<Quiz>> {
        self.store.get_quiz_by_id(quiz_id).await
    }

    pub async fn is_hidden(&self, quiz_id: i64) -> CoreResult<Option<bool>> {
        self.store.is_hidden(quiz_id).await
    }

    pub async fn list_quizzes(&self, include_hidden: bool) -> CoreResult<Vec<Quiz>> {
        self.store.list_quizzes(include_hidden).await
    }

    pub async fn list_quizzes_by_creator(&self, creator_id: i64) -> CoreResult<Vec<Quiz>> {
        self.store.list_quizzes_by_creator(creator_id).await
    }

    pub async fn get_questions_by_quiz(&self, quiz_id: i64) -> CoreResult<Vec<Question>> {
        self.store.get_questions_by_quiz(quiz_id).await
    }

    pub async fn get_options_by_question(&self, question_id: i64) -> CoreResult<Vec<Choice>> {
        self.store.get_options_by_question(question_id).await
    }

    pub async fn count_questions(&self, quiz_id: i64) -> CoreResult<i64> {
        self.store.count_questions(quiz_id).await
    }

    /// Loads the quiz with every question and option. `None` if the quiz does not exist.
    pub async fn load_snapshot(&self, quiz_id: i64) -> CoreResult<Option<QuizSnapshot>> {
        let Some(quiz) = self.store.get_quiz_by_id(quiz_id).await? else {
            return Ok(None);
        };

        let questions = self.store.get_questions_by_quiz(quiz_id).await?;
        let mut loaded = Vec::with_capacity(questions.len());
        for question in questions {
            let options = self.store.get_options_by_question(question.id).await?;
            loaded.push(SnapshotQuestion { question, options });
        }

        Ok(Some(QuizSnapshot {
            quiz,
            questions: loaded,
        }))
    }
}
