use std::sync::Arc;
use anyhow::{Context, Result};
use redis::{AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use crate::config::environment::EnvironmentVariables;

/// Session payload stored in Redis at `session:{token}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct RedisService {
    client: Client,
    session_ttl_seconds: u64,
    crawl_interval_seconds: u64,
}

impl RedisService {
    pub fn new(env: Arc<EnvironmentVariables>) -> Result<Self> {
        let client = Client::open(env.redis_url.as_ref())
            .context("Failed to create Redis client")?;
        Ok(Self {
            client,
            session_ttl_seconds: env.session_ttl_seconds,
            crawl_interval_seconds: env.crawl_interval_seconds,
        })
    }

    pub async fn initialize(&self) -> Result<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await
            .context("Failed to connect to Redis")?;

        // Simple ping to verify connection
        let _: () = redis::cmd("PING").query_async(&mut conn).await
            .context("Failed to ping Redis")?;

        info!("Redis connection established successfully");
        Ok(())
    }

    pub async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client.get_multiplexed_async_connection().await
            .context("Failed to get Redis multiplexed connection")
    }

    pub async fn shutdown(&self) {
        // Redis client handles connection pooling/dropping automatically.
        // No explicit shutdown required for the client itself.
        info!("Redis service shutdown (noop)");
    }

    /// Stores a session under `session:{token}` with the configured TTL
    pub async fn store_session(&self, token: &str, session: &SessionData) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let key = format!("session:{}", token);
        let payload: String = serde_json::to_string(session)
            .context("Failed to serialize session data")?;

        let _: () = conn.set_ex(&key, payload, self.session_ttl_seconds).await
            .context("Failed to store session in Redis")?;

        Ok(())
    }

    /// Looks up a session token; None if unknown or expired
    pub async fn load_session(&self, token: &str) -> Result<Option<SessionData>> {
        let mut conn = self.get_connection().await?;
        let key = format!("session:{}", token);

        let payload: Option<String> = conn.get(&key).await
            .context("Failed to load session from Redis")?;

        match payload {
            Some(json) => {
                let session: SessionData = serde_json::from_str(&json)
                    .context("Failed to deserialize session data")?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Removes a session token (logout)
    pub async fn delete_session(&self, token: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let key = format!("session:{}", token);

        let _: () = conn.del(&key).await
            .context("Failed to delete session from Redis")?;

        Ok(())
    }

    /// Checks whether a Bilibili account was crawled within the interval
    pub async fn crawl_is_fresh(&self, mid: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let key = format!("crawl:mid:{}", mid);

        let exists: bool = redis::cmd("EXISTS")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .context("Failed to check crawl freshness in Redis")?;

        Ok(exists)
    }

    /// Marks a Bilibili account as freshly crawled, expiring after the
    /// crawl interval so the next sweep picks it up again
    pub async fn mark_crawled(&self, mid: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        let key = format!("crawl:mid:{}", mid);

        let _: () = redis::cmd("SET")
            .arg(&key)
            .arg("fresh") // Value doesn't matter much, just existence
            .arg("EX")
            .arg(self.crawl_interval_seconds)
            .query_async(&mut conn)
            .await
            .context("Failed to mark crawl freshness in Redis")?;

        Ok(())
    }
}
