use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    time::{timeout, Instant},
};

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, UserId},
};

/// Redis keyspace used by the service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// A single catalogue entry
    Movie(MovieId),
    /// A user's analysis history list (fallback history tier)
    History(UserId),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Movie(id) => write!(f, "movie:{}", id),
            CacheKey::History(user) => write!(f, "history:{}", user),
        }
    }
}

/// Opens a Redis client
///
/// Only the URL is parsed here; connections are opened on first use.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    Ok(Client::open(redis_url)?)
}

/// Writes that may wait for the writer before new ones are dropped
const WRITE_QUEUE_CAPACITY: usize = 1024;
/// Longest the writer waits for Redis to accept a connection
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// How long writes are dropped after Redis could not be reached
const RECONNECT_BACKOFF: Duration = Duration::from_secs(30);

/// A serialized value waiting to be written
struct PendingWrite {
    key: String,
    json: String,
    ttl_secs: u64,
}

/// Read-through cache for catalogue lookups
///
/// Reads go straight to Redis. Writes are handed to a background
/// [`CacheWriter`] over a bounded queue, so a slow or absent Redis never
/// delays a response and never grows memory without limit.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    pending: mpsc::Sender<PendingWrite>,
}

/// Owner's handle on the background writer
pub struct CacheWriterHandle {
    stop: oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Stops the writer after it has dealt with every queued write
    ///
    /// Queued writes are flushed over a live connection and dropped otherwise.
    pub async fn shutdown(self) {
        // The writer may already be gone; joining below covers both cases
        let _ = self.stop.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

/// Drains queued writes over one reconnecting connection
struct CacheWriter {
    client: Client,
    connection: Option<ConnectionManager>,
    /// Set after a failed connect; no new attempt is made before it
    retry_at: Option<Instant>,
    pending: mpsc::Receiver<PendingWrite>,
}

impl CacheWriter {
    async fn run(mut self, mut stop: oneshot::Receiver<()>) {
        tracing::debug!("Cache writer started");

        loop {
            tokio::select! {
                next = self.pending.recv() => match next {
                    Some(write) => {
                        self.write(write).await;
                    }
                    None => break,
                },
                _ = &mut stop => {
                    self.drain().await;
                    break;
                }
            }
        }
    }

    /// Flushes what is queued without opening a new connection
    async fn drain(&mut self) {
        self.pending.close();

        let (mut flushed, mut dropped) = (0usize, 0usize);
        while let Some(write) = self.pending.recv().await {
            if self.connection.is_some() && self.write(write).await {
                flushed += 1;
            } else {
                dropped += 1;
            }
        }
        tracing::info!(flushed, dropped, "Cache writer drained queued writes");
    }

    /// Returns whether the value reached Redis
    async fn write(&mut self, write: PendingWrite) -> bool {
        let Some(connection) = self.connection().await else {
            tracing::debug!(key = %write.key, "Redis unreachable, cache write dropped");
            return false;
        };

        let result: redis::RedisResult<()> = connection
            .set_ex(&write.key, &write.json, write.ttl_secs)
            .await;
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %write.key, error = %e, "Cache write failed");
                self.back_off();
                false
            }
        }
    }

    /// The live connection, opening one unless a recent attempt failed
    async fn connection(&mut self) -> Option<&mut ConnectionManager> {
        if self.connection.is_none() {
            if self.retry_at.is_some_and(|at| Instant::now() < at) {
                return None;
            }

            match timeout(CONNECT_TIMEOUT, ConnectionManager::new(self.client.clone())).await {
                Ok(Ok(connection)) => {
                    tracing::debug!("Cache writer connected to Redis");
                    self.connection = Some(connection);
                    self.retry_at = None;
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Cache writer could not connect to Redis");
                    self.back_off();
                }
                Err(_) => {
                    tracing::warn!("Cache writer timed out connecting to Redis");
                    self.back_off();
                }
            }
        }

        self.connection.as_mut()
    }

    fn back_off(&mut self) {
        self.connection = None;
        self.retry_at = Some(Instant::now() + RECONNECT_BACKOFF);
    }
}

impl Cache {
    /// Creates a cache and spawns its background writer
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        Self::with_queue_capacity(redis_client, WRITE_QUEUE_CAPACITY)
    }

    fn with_queue_capacity(redis_client: Client, capacity: usize) -> (Self, CacheWriterHandle) {
        let (pending_tx, pending_rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = oneshot::channel();

        let writer = CacheWriter {
            client: redis_client.clone(),
            connection: None,
            retry_at: None,
            pending: pending_rx,
        };
        let task = tokio::spawn(writer.run(stop_rx));

        let cache = Self {
            redis_client,
            pending: pending_tx,
        };
        (cache, CacheWriterHandle { stop: stop_tx, task })
    }

    /// Looks a key up, `Ok(None)` on a miss
    ///
    /// An entry that no longer deserializes is treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(key.to_string()).await?;

        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding unreadable cache entry");
                None
            }
        }))
    }

    /// Queues a value to be written with the given TTL
    ///
    /// Never waits: when the queue is full or the writer has stopped, the
    /// write is dropped.
    pub fn put_later<T: Serialize>(&self, key: &CacheKey, value: &T, ttl_secs: u64) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let write = PendingWrite {
            key: key.to_string(),
            json,
            ttl_secs,
        };
        match self.pending.try_send(write) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(key = %key, "Cache write queue full, write dropped");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(key = %key, "Cache writer stopped, write dropped");
            }
        }
        Ok(())
    }

    /// Number of writes waiting for the writer
    pub fn queued_writes(&self) -> usize {
        self.pending.max_capacity() - self.pending.capacity()
    }
}
