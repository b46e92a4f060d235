use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{AnalysisRecord, EmotionVector, UserId},
    services::history::HistoryStore,
};

/// Primary history tier backed by the `analyses` table
///
/// Every analysis is kept; `read` returns the newest `retention` rows.
#[derive(Clone)]
pub struct PostgresHistoryStore {
    db_pool: PgPool,
    retention: usize,
}

#[derive(Debug, sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    emotions: Json<EmotionVector>,
    movie_count: i32,
    created_at: DateTime<Utc>,
}

impl From<AnalysisRow> for AnalysisRecord {
    fn from(row: AnalysisRow) -> Self {
        AnalysisRecord {
            id: row.id,
            created_at: row.created_at,
            emotions: row.emotions.0,
            movie_count: u32::try_from(row.movie_count).unwrap_or(0),
        }
    }
}

impl PostgresHistoryStore {
    pub fn new(db_pool: PgPool, retention: usize) -> Self {
        Self { db_pool, retention }
    }
}

fn unavailable(e: sqlx::Error) -> AppError {
    tracing::error!(error = %e, "History query failed");
    AppError::StoreUnavailable(e.to_string())
}

#[async_trait::async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn append(&self, user: &UserId, record: &AnalysisRecord) -> AppResult<()> {
        let movie_count = i32::try_from(record.movie_count).unwrap_or(i32::MAX);

        sqlx::query(
            r#"
            INSERT INTO analyses (id, user_id, emotions, movie_count, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id)
        .bind(user.as_str())
        .bind(Json(record.emotions))
        .bind(movie_count)
        .bind(record.created_at)
        .execute(&self.db_pool)
        .await
        .map_err(unavailable)?;

        Ok(())
    }

    async fn read(&self, user: &UserId) -> AppResult<Vec<AnalysisRecord>> {
        let limit = i64::try_from(self.retention).unwrap_or(i64::MAX);

        let rows: Vec<AnalysisRow> = sqlx::query_as(
            r#"
            SELECT id, emotions, movie_count, created_at
            FROM analyses
            WHERE user_id = $1
            ORDER BY created_at DESC, id
            LIMIT $2
            "#,
        )
        .bind(user.as_str())
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await
        .map_err(unavailable)?;

        Ok(rows.into_iter().map(AnalysisRecord::from).collect())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmotionKey;

    #[test]
    fn test_row_conversion() {
        let emotions = EmotionVector::empty().with(EmotionKey::Sadness, 0.6);
        let row = AnalysisRow {
            id: Uuid::new_v4(),
            emotions: Json(emotions),
            movie_count: 8,
            created_at: Utc::now(),
        };
        let id = row.id;

        let record = AnalysisRecord::from(row);
        assert_eq!(record.id, id);
        assert_eq!(record.emotions, emotions);
        assert_eq!(record.movie_count, 8);
    }
}
