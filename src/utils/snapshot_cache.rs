// src/utils/snapshot_cache.rs

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::{error::CoreResult, models::snapshot::QuizSnapshot, services::Catalog};

/// Quiz snapshots handed out to students, keyed by attempt ID.
///
/// Answers are graded against the entry for their attempt. Entries are
/// dropped when the attempt completes, and entries older than `ttl` are
/// evicted whenever a new one is stored.
pub struct SnapshotCache {
    inner: RwLock<HashMap<i64, CachedSnapshot>>,
    ttl: Duration,
}

struct CachedSnapshot {
    snapshot: Arc<QuizSnapshot>,
    cached_at: Instant,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Keeps the first snapshot stored for an attempt, so a resumed attempt is
    /// still graded against what the student saw first.
    pub async fn remember(&self, attempt_id: i64, snapshot: QuizSnapshot) -> Arc<QuizSnapshot> {
        let mut guard = self.inner.write().await;

        let before = guard.len();
        guard.retain(|id, entry| *id == attempt_id || entry.cached_at.elapsed() < self.ttl);
        let evicted = before - guard.len();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted stale quiz snapshots");
        }

        guard
            .entry(attempt_id)
            .or_insert_with(|| CachedSnapshot {
                snapshot: Arc::new(snapshot),
                cached_at: Instant::now(),
            })
            .snapshot
            .clone()
    }

    pub async fn get(&self, attempt_id: i64) -> Option<Arc<QuizSnapshot>> {
        self.inner
            .read()
            .await
            .get(&attempt_id)
            .map(|entry| entry.snapshot.clone())
    }

    /// Returns the cached snapshot, or reloads it from the catalog (e.g. after a
    /// restart). `None` if the quiz no longer exists.
    pub async fn get_or_load(
        &self,
        attempt_id: i64,
        quiz_id: i64,
        catalog: &Catalog,
    ) -> CoreResult<Option<Arc<QuizSnapshot>>> {
        if let Some(snapshot) = self.get(attempt_id).await {
            return Ok(Some(snapshot));
        }

        tracing::warn!(attempt_id, quiz_id, "No snapshot cached for attempt, reloading quiz");
        match catalog.load_snapshot(quiz_id).await? {
            Some(snapshot) => Ok(Some(self.remember(attempt_id, snapshot).await)),
            None => Ok(None),
        }
    }

    pub async fn forget(&self, attempt_id: i64) {
        self.inner.write().await.remove(&attempt_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::Quiz;

    fn snapshot(title: &str) -> QuizSnapshot {
        QuizSnapshot {
            quiz: Quiz {
                id: 1,
                title: title.to_string(),
                description: String::new(),
                created_by: 1,
                author_name: None,
                is_hidden: false,
                created_at: chrono::Utc::now(),
            },
            questions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_remember_keeps_first_snapshot() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache.remember(5, snapshot("first")).await;
        let kept = cache.remember(5, snapshot("second")).await;
        assert_eq!(kept.quiz.title, "first");
        assert_eq!(cache.get(5).await.unwrap().quiz.title, "first");
    }

    #[tokio::test]
    async fn test_forget_drops_entry() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache.remember(5, snapshot("first")).await;
        cache.forget(5).await;
        assert!(cache.get(5).await.is_none());
    }

    #[tokio::test]
    async fn test_abandoned_snapshots_are_evicted() {
        let cache = SnapshotCache::new(Duration::from_millis(20));
        cache.remember(5, snapshot("abandoned")).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        cache.remember(6, snapshot("fresh")).await;

        assert!(cache.get(5).await.is_none());
        assert_eq!(cache.get(6).await.unwrap().quiz.title, "fresh");
    }

    #[tokio::test]
    async fn test_live_snapshots_survive_eviction() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache.remember(5, snapshot("first")).await;
        cache.remember(6, snapshot("second")).await;

        assert!(cache.get(5).await.is_some());
        assert!(cache.get(6).await.is_some());
    }
}
