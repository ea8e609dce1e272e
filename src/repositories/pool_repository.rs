use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{errors::AppResult, models::Question};

/// Durable storage for the question pool: one key, one JSON array.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PoolRepository: Send + Sync {
    async fn load(&self) -> AppResult<Vec<Question>>;
    async fn save(&self, pool: &[Question]) -> AppResult<()>;
}

pub struct FilePoolRepository {
    path: PathBuf,
}

impl FilePoolRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PoolRepository for FilePoolRepository {
    async fn load(&self) -> AppResult<Vec<Question>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };

        // Corrupt data is treated as an empty pool, never as a fatal error.
        match serde_json::from_str(&contents) {
            Ok(pool) => Ok(pool),
            Err(err) => {
                log::warn!(
                    "Question pool at {} is corrupt ({}), starting empty",
                    self.path.display(),
                    err
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, pool: &[Question]) -> AppResult<()> {
        let json = serde_json::to_string(pool)
            .map_err(|e| crate::errors::AppError::Storage(e.to_string()))?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}
