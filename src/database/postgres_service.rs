use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use tokio::sync::RwLock;
use tracing::{debug, info, log::LevelFilter};

use crate::config::environment::EnvironmentVariables;

const MAX_POOL_CONNECTIONS: u32 = 10;

/// PostgreSQL service owning the application connection pool.
/// The pool is created lazily on first use so that constructing an
/// `AppState` never requires a live database (e.g. in tests).
#[derive(Clone, Debug)]
pub struct PostgresService {
    pool: Arc<RwLock<Option<PgPool>>>,
    config: Arc<EnvironmentVariables>,
}

impl PostgresService {
    /// Creates a new PostgresService instance
    pub fn new(config: Arc<EnvironmentVariables>) -> Self {
        Self {
            pool: Arc::new(RwLock::new(None)),
            config,
        }
    }

    /// Connects (if needed) and creates the application tables.
    /// Should be called once at application startup.
    pub async fn initialize(&self) -> Result<()> {
        info!("Initializing PostgresService...");

        let pool: PgPool = self.pool().await?;
        self.create_schema(&pool).await
            .context("Failed to create application schema")?;

        info!("PostgresService initialized successfully");
        Ok(())
    }

    /// Returns the shared pool, connecting on first call
    pub async fn pool(&self) -> Result<PgPool> {
        // Hot path: pool already exists
        {
            let guard = self.pool.read().await;
            if let Some(pool) = guard.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut guard = self.pool.write().await;
        // Another task may have connected while we waited for the write lock
        if let Some(pool) = guard.as_ref() {
            return Ok(pool.clone());
        }

        let options: PgConnectOptions = PgConnectOptions::new()
            .host(&self.config.db_host)
            .port(self.config.db_port)
            .username(&self.config.db_user)
            .password(&self.config.db_password)
            .database(&self.config.db_name)
            .log_statements(LevelFilter::Debug);

        let pool: PgPool = PgPoolOptions::new()
            .max_connections(MAX_POOL_CONNECTIONS)
            .connect_with(options)
            .await
            .context("Failed to connect to PostgreSQL")?;

        debug!(
            "Connected to PostgreSQL at {}:{}/{}",
            self.config.db_host, self.config.db_port, self.config.db_name
        );

        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// Creates all application tables, the updated_at trigger function
    /// and per-table triggers. Idempotent.
    async fn create_schema(&self, pool: &PgPool) -> Result<()> {
        // Ensure UTC timezone for this connection
        sqlx::query("SET timezone = 'UTC'")
            .execute(pool)
            .await
            .context("Failed to set timezone to UTC")?;

        self.create_updated_at_function(pool).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                username VARCHAR NOT NULL UNIQUE,
                email VARCHAR NOT NULL UNIQUE,
                password_hash VARCHAR NOT NULL,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#
        )
        .execute(pool)
        .await
        .context("Failed to create users table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS influencers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                name VARCHAR NOT NULL,
                profile_picture VARCHAR NOT NULL,
                bilibili_mid VARCHAR UNIQUE,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW()
            )
            "#
        )
        .execute(pool)
        .await
        .context("Failed to create influencers table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS videos (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                influencer_id UUID NOT NULL REFERENCES influencers(id) ON DELETE CASCADE,
                title VARCHAR NOT NULL,
                url VARCHAR NOT NULL,
                thumbnail VARCHAR NOT NULL DEFAULT '',
                source_aid VARCHAR,
                place_name VARCHAR,
                longitude DOUBLE PRECISION,
                latitude DOUBLE PRECISION,
                created_at TIMESTAMPTZ DEFAULT NOW(),
                updated_at TIMESTAMPTZ DEFAULT NOW(),
                UNIQUE (influencer_id, source_aid)
            )
            "#
        )
        .execute(pool)
        .await
        .context("Failed to create videos table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS follows (
                user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                influencer_id UUID NOT NULL REFERENCES influencers(id) ON DELETE CASCADE,
                followed_at TIMESTAMPTZ DEFAULT NOW(),
                PRIMARY KEY (user_id, influencer_id)
            )
            "#
        )
        .execute(pool)
        .await
        .context("Failed to create follows table")?;

        for table in ["users", "influencers", "videos"] {
            self.create_updated_at_trigger(pool, table).await?;
        }

        Ok(())
    }

    /// Creates the update_updated_at_column function for automatic timestamp updates
    async fn create_updated_at_function(&self, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE OR REPLACE FUNCTION update_updated_at_column()
            RETURNS TRIGGER AS $$
            BEGIN
                NEW.updated_at = NOW();
                RETURN NEW;
            END;
            $$ language 'plpgsql'
            "#
        )
        .execute(pool)
        .await
        .context("Failed to create update_updated_at_column function")?;

        Ok(())
    }

    /// Creates an updated_at trigger for the specified table
    async fn create_updated_at_trigger(&self, pool: &PgPool, table_name: &str) -> Result<()> {
        let trigger_name: String = format!("update_{}_updated_at", table_name);

        // Drop existing trigger first
        let drop_query: String = format!(
            "DROP TRIGGER IF EXISTS {} ON {}",
            trigger_name, table_name
        );

        sqlx::query(&drop_query)
            .execute(pool)
            .await
            .context(format!("Failed to drop existing trigger for {}", table_name))?;

        // Create new trigger
        let create_query: String = format!(
            r#"
            CREATE TRIGGER {}
                BEFORE UPDATE ON {}
                FOR EACH ROW
                EXECUTE FUNCTION update_updated_at_column()
            "#,
            trigger_name, table_name
        );

        sqlx::query(&create_query)
            .execute(pool)
            .await
            .context(format!("Failed to create updated_at trigger for {}", table_name))?;

        Ok(())
    }

    /// Gracefully closes the connection pool
    pub async fn shutdown(&self) {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            info!("PostgreSQL pool closed");
        }
    }
}
