use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::thread_rng;
use tokio::sync::RwLock;

use crate::{models::Question, repositories::PoolRepository};

/// In-memory reservoir of unused questions, mirrored to storage after every
/// mutation. Persistence is best-effort: a failed save is logged and the
/// in-memory pool stays authoritative for the session.
pub struct QuestionPoolService {
    repository: Arc<dyn PoolRepository>,
    pool: RwLock<Vec<Question>>,
    cap: usize,
}

impl QuestionPoolService {
    /// Hydrates the pool from storage. A failed load degrades to an empty
    /// pool rather than refusing to start.
    pub async fn new(repository: Arc<dyn PoolRepository>, cap: usize) -> Self {
        let initial = match repository.load().await {
            Ok(pool) => {
                log::info!("Loaded {} pooled questions", pool.len());
                pool
            }
            Err(err) => {
                log::warn!("Could not load question pool ({}), starting empty", err);
                Vec::new()
            }
        };

        Self {
            repository,
            pool: RwLock::new(initial),
            cap,
        }
    }

    pub async fn len(&self) -> usize {
        self.pool.read().await.len()
    }

    /// Removes and returns up to `count` questions, chosen by a uniform
    /// shuffle of the whole pool to avoid staleness bias. Returns fewer when
    /// the pool runs short; never waits for generation.
    pub async fn draw(&self, count: usize) -> Vec<Question> {
        let mut pool = self.pool.write().await;
        pool.shuffle(&mut thread_rng());

        let take = count.min(pool.len());
        let drawn: Vec<Question> = pool.drain(..take).collect();
        if !drawn.is_empty() {
            self.persist(&pool).await;
        }
        drawn
    }

    /// Merges candidates into the pool, skipping demo questions and any whose
    /// text already exists (exact match). Returns the number actually added.
    pub async fn add_unique(&self, candidates: Vec<Question>) -> usize {
        let mut pool = self.pool.write().await;
        let mut seen: HashSet<String> = pool.iter().map(|q| q.text.clone()).collect();

        let mut added = 0;
        for candidate in candidates {
            if candidate.is_demo {
                continue;
            }
            if pool.len() >= self.cap {
                log::info!("Question pool at capacity ({}), dropping overflow", self.cap);
                break;
            }
            if seen.insert(candidate.text.clone()) {
                pool.push(candidate);
                added += 1;
            }
        }

        if added > 0 {
            self.persist(&pool).await;
        }
        added
    }

    /// Retracts pool entries matching the given questions' text. Used after a
    /// completed round consumed questions drawn from a shared pool.
    pub async fn remove(&self, questions: &[Question]) {
        let texts: HashSet<&str> = questions.iter().map(|q| q.text.as_str()).collect();

        let mut pool = self.pool.write().await;
        let before = pool.len();
        pool.retain(|q| !texts.contains(q.text.as_str()));

        if pool.len() != before {
            self.persist(&pool).await;
        }
    }

    async fn persist(&self, snapshot: &[Question]) {
        if let Err(err) = self.repository.save(snapshot).await {
            log::warn!("Could not persist question pool: {}", err);
        }
    }
}
