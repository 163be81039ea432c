// Application state management with singleton pattern

use std::sync::Arc;
use once_cell::sync::Lazy;
use crate::config::environment::EnvironmentVariables;
use crate::crawler::bilibili::BilibiliClient;
use crate::database::{PostgresService, RedisService};

// AppState singleton
#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub database: PostgresService,
    pub redis: RedisService,
    pub bilibili: BilibiliClient,
}

impl AppState {
    /// Creates a new AppState instance (private constructor)
    fn new() -> anyhow::Result<Self> {
        let environment: EnvironmentVariables = EnvironmentVariables::load()?;
        let environment_arc: Arc<EnvironmentVariables> = Arc::new(environment);

        // Create services
        let database: PostgresService = PostgresService::new(environment_arc.clone());
        let redis: RedisService = RedisService::new(environment_arc.clone())?;
        let bilibili: BilibiliClient = BilibiliClient::new(environment_arc.clone())?;

        Ok(Self {
            environment: environment_arc,
            database,
            redis,
            bilibili,
        })
    }

    /// Returns the singleton instance
    pub fn instance() -> &'static Self {
        static INSTANCE: Lazy<AppState> = Lazy::new(|| {
            AppState::new().expect("Failed to initialize AppState")
        });
        &INSTANCE
    }

    /// Connects to Postgres and Redis and runs the schema migration
    pub async fn init_services() -> anyhow::Result<()> {
        let instance: &'static AppState = Self::instance();

        // Initialize both DB and Redis
        instance.database.initialize().await?;
        instance.redis.initialize().await?;

        tracing::info!("Services (DB + Redis) initialized successfully");
        Ok(())
    }

    /// Gracefully shutdown all database connections
    pub async fn shutdown() {
        let instance: &'static AppState = Self::instance();
        instance.database.shutdown().await;
        instance.redis.shutdown().await;
    }
}
