use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{AnalysisRecord, UserId},
    services::history::HistoryStore,
};

/// Primary store with a fallback tier, presented as one store
///
/// Appends go to both tiers so the fallback stays warm; the call succeeds if
/// either tier accepted the record. Reads come from the primary and fall back
/// to the secondary only when the primary fails. Callers cannot tell which
/// tier answered.
pub struct TieredHistoryStore {
    primary: Arc<dyn HistoryStore>,
    fallback: Arc<dyn HistoryStore>,
}

impl TieredHistoryStore {
    pub fn new(primary: Arc<dyn HistoryStore>, fallback: Arc<dyn HistoryStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait::async_trait]
impl HistoryStore for TieredHistoryStore {
    async fn append(&self, user: &UserId, record: &AnalysisRecord) -> AppResult<()> {
        let primary = self.primary.append(user, record).await;
        let fallback = self.fallback.append(user, record).await;

        match (primary, fallback) {
            (Ok(()), Ok(())) => Ok(()),
            (Ok(()), Err(e)) => {
                tracing::warn!(
                    store = self.fallback.name(),
                    error = %e,
                    "Fallback history append failed"
                );
                Ok(())
            }
            (Err(e), Ok(())) => {
                tracing::warn!(
                    store = self.primary.name(),
                    error = %e,
                    "Primary history append failed, kept in fallback only"
                );
                Ok(())
            }
            (Err(primary_err), Err(fallback_err)) => {
                tracing::error!(
                    primary_error = %primary_err,
                    fallback_error = %fallback_err,
                    "History append failed on every tier"
                );
                Err(AppError::StoreUnavailable(
                    "Analysis history could not be saved".to_string(),
                ))
            }
        }
    }

    async fn read(&self, user: &UserId) -> AppResult<Vec<AnalysisRecord>> {
        let primary_err = match self.primary.read(user).await {
            Ok(history) => return Ok(history),
            Err(e) => e,
        };

        tracing::warn!(
            store = self.primary.name(),
            error = %primary_err,
            "Primary history read failed, trying fallback"
        );

        self.fallback.read(user).await.map_err(|fallback_err| {
            tracing::error!(
                primary_error = %primary_err,
                fallback_error = %fallback_err,
                "History read failed on every tier"
            );
            AppError::StoreUnavailable("Analysis history is unavailable".to_string())
        })
    }

    fn name(&self) -> &'static str {
        "tiered"
    }
}
