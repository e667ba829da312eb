// src/services/recorder.rs

use std::sync::Arc;

use crate::{
    error::CoreResult,
    models::response::{NewResponse, Response},
    store::ResponseStore,
};

/// Persists graded answers and derives scores from them.
#[derive(Clone)]
pub struct ResponseRecorder {
    store: Arc<dyn ResponseStore>,
}

impl ResponseRecorder {
    pub fn new(store: Arc<dyn ResponseStore>) -> Self {
        Self { store }
    }

    /// Writes the batch. An empty batch never reaches storage.
    pub async fn save_responses(&self, attempt_id: i64, responses: &[NewResponse]) -> CoreResult<u64> {
        if responses.is_empty() {
            return Ok(0);
        }

        let written = self.store.save_responses(attempt_id, responses).await?;
        tracing::debug!(attempt_id, written, "Responses saved");
        Ok(written)
    }

    pub async fn calculate_score(&self, attempt_id: i64) -> CoreResult<i64> {
        self.store.calculate_score(attempt_id).await
    }

    /// Option picked for one question, or `None` if it was left unanswered.
    pub async fn get_chosen_option_id(&self, attempt_id: i64, question_id: i64) -> CoreResult<Option<i64>> {
        Ok(self
            .store
            .get_response(attempt_id, question_id)
            .await?
            .map(|response| response.option_id))
    }

    pub async fn get_response(&self, attempt_id: i64, question_id: i64) -> CoreResult<Option<Response>> {
        self.store.get_response(attempt_id, question_id).await
    }
}
