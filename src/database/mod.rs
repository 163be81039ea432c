pub mod postgres_service;
pub mod redis_service;

pub use postgres_service::PostgresService;
pub use redis_service::{RedisService, SessionData};
