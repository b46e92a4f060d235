//! Analysis history abstraction
//!
//! Each user's past recommendation queries are kept most-recent-first. The
//! store owns retention: `read` returns whatever the store still holds, and
//! profile aggregation works with any cap. In production the history lives in
//! two tiers, PostgreSQL first and Redis as the fallback, combined by
//! [`TieredHistoryStore`] behind the same trait.

use crate::{
    error::AppResult,
    models::{AnalysisRecord, UserId},
};

pub mod memory;
pub mod postgres;
pub mod redis;
pub mod tiered;

pub use memory::InMemoryHistoryStore;
pub use self::postgres::PostgresHistoryStore;
pub use self::redis::RedisHistoryStore;
pub use tiered::TieredHistoryStore;

/// Append/read access to users' analysis histories
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Records one analysis for a user. Fails with `StoreUnavailable`.
    async fn append(&self, user: &UserId, record: &AnalysisRecord) -> AppResult<()>;

    /// Returns the user's retained analyses, most recent first
    ///
    /// An unknown user has an empty history. Fails with `StoreUnavailable`.
    async fn read(&self, user: &UserId) -> AppResult<Vec<AnalysisRecord>>;

    /// Store name for logging and debugging
    fn name(&self) -> &'static str;
}
