use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    errors::AppResult,
    repositories::FilePoolRepository,
    services::{
        generator::{GeminiGenerator, QuestionSource},
        pool::QuestionPoolService,
        room::RoomSession,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<QuestionPoolService>,
    pub generator: Arc<dyn QuestionSource>,
    pub config: Arc<Config>,
    rooms: Arc<RwLock<HashMap<String, Arc<RoomSession>>>>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let repository = Arc::new(FilePoolRepository::new(&config.pool_file));
        let pool = Arc::new(QuestionPoolService::new(repository, config.pool_cap).await);
        let generator: Arc<dyn QuestionSource> = Arc::new(GeminiGenerator::new(&config));

        Ok(Self {
            pool,
            generator,
            config: Arc::new(config),
            rooms: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// Rooms are created lazily on first touch; every room shares the pool
    /// and the generator.
    pub async fn room(&self, room_id: &str) -> Arc<RoomSession> {
        if let Some(room) = self.rooms.read().await.get(room_id) {
            return Arc::clone(room);
        }

        let mut rooms = self.rooms.write().await;
        Arc::clone(rooms.entry(room_id.to_string()).or_insert_with(|| {
            log::info!("Creating room {}", room_id);
            RoomSession::new(
                room_id,
                Arc::clone(&self.pool),
                Arc::clone(&self.generator),
                Arc::clone(&self.config),
            )
        }))
    }

    #[cfg(test)]
    pub fn with_parts(
        pool: Arc<QuestionPoolService>,
        generator: Arc<dyn QuestionSource>,
        config: Config,
    ) -> Self {
        Self {
            pool,
            generator,
            config: Arc::new(config),
            rooms: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}
