use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{AnalysisRecord, UserId},
    services::history::HistoryStore,
};

/// History kept in process memory, capped per user
pub struct InMemoryHistoryStore {
    retention: usize,
    inner: RwLock<HashMap<UserId, VecDeque<AnalysisRecord>>>,
}

impl InMemoryHistoryStore {
    pub fn new(retention: usize) -> Self {
        Self {
            retention,
            inner: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn append(&self, user: &UserId, record: &AnalysisRecord) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let history = inner.entry(user.clone()).or_default();
        history.push_front(record.clone());
        history.truncate(self.retention);
        Ok(())
    }

    async fn read(&self, user: &UserId) -> AppResult<Vec<AnalysisRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(user)
            .map(|history| history.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
