use crate::error::Result;
use redis::{Client, Pipeline, aio::ConnectionManager};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct RedisClient {
    manager: Arc<Mutex<ConnectionManager>>,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager: Arc::new(Mutex::new(manager)),
        })
    }

    // Fixed-window rate limiting
    pub async fn check_rate_limit(
        &self,
        key: &str,
        limit: u32,
        window_seconds: usize,
    ) -> Result<bool> {
        let mut conn = self.manager.lock().await;

        let (current,): (u32,) = rate_limit_pipeline(key, window_seconds)
            .query_async(&mut *conn)
            .await?;

        Ok(current <= limit)
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.lock().await;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(())
    }
}

/// Creates the window with its expiry in the same transaction as the first
/// increment, so a counter never outlives its window.
fn rate_limit_pipeline(key: &str, window_seconds: usize) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SET")
        .arg(key)
        .arg(0)
        .arg("NX")
        .arg("EX")
        .arg(window_seconds)
        .ignore()
        .incr(key, 1);
    pipe
}
