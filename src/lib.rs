// Library root for the mediacrawler service

pub mod api;
pub mod config;
pub mod core;
pub mod crawler;
pub mod database;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::database::{PostgresService, RedisService};
