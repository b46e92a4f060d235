use redis::{AsyncCommands, Client};

use crate::{
    db::CacheKey,
    error::{AppError, AppResult},
    models::{AnalysisRecord, UserId},
    services::history::HistoryStore,
};

/// Fallback history tier: a capped Redis list per user, newest at the head
#[derive(Clone)]
pub struct RedisHistoryStore {
    redis_client: Client,
    retention: usize,
    ttl_secs: u64,
}

impl RedisHistoryStore {
    pub fn new(redis_client: Client, retention: usize, ttl_secs: u64) -> Self {
        Self {
            redis_client,
            retention,
            ttl_secs,
        }
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.redis_client
            .get_multiplexed_async_connection()
            .await
            .map_err(unavailable)
    }
}

fn unavailable(e: redis::RedisError) -> AppError {
    tracing::warn!(error = %e, "Redis history operation failed");
    AppError::StoreUnavailable(e.to_string())
}

#[async_trait::async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn append(&self, user: &UserId, record: &AnalysisRecord) -> AppResult<()> {
        let key = CacheKey::History(user.clone()).to_string();
        let json = serde_json::to_string(record)
            .map_err(|e| AppError::Internal(format!("History serialization error: {}", e)))?;
        let last_index = self.retention.saturating_sub(1) as isize;
        let ttl = i64::try_from(self.ttl_secs).unwrap_or(i64::MAX);

        let mut conn = self.connection().await?;
        let _: () = redis::pipe()
            .atomic()
            .lpush(&key, json)
            .ignore()
            .ltrim(&key, 0, last_index)
            .ignore()
            .expire(&key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(unavailable)?;

        Ok(())
    }

    async fn read(&self, user: &UserId) -> AppResult<Vec<AnalysisRecord>> {
        let key = CacheKey::History(user.clone()).to_string();
        let mut conn = self.connection().await?;
        let entries: Vec<String> = conn.lrange(&key, 0, -1).await.map_err(unavailable)?;

        let records = entries
            .iter()
            .filter_map(|json| match serde_json::from_str::<AnalysisRecord>(json) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, user = %user, "Skipping unreadable history entry");
                    None
                }
            })
            .take(self.retention)
            .collect();

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
