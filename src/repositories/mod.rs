pub mod pool_repository;

pub use pool_repository::{FilePoolRepository, PoolRepository};

#[cfg(test)]
pub use pool_repository::MockPoolRepository;
