pub mod generator;
pub mod pool;
pub mod room;
pub mod scan_router;
pub mod session;
