use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::Display;
use uuid::Uuid;

use super::{EmotionKey, EmotionVector};
use crate::error::{AppError, AppResult};

/// Opaque identifier of the user a history belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidQuery("User id must not be empty".to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One past recommendation query and how many movies it produced
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub emotions: EmotionVector,
    pub movie_count: u32,
}

impl AnalysisRecord {
    pub fn new(emotions: EmotionVector, movie_count: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            emotions,
            movie_count,
        }
    }
}

/// Average of a user's past queries over the base emotions
///
/// Extended emotions are always zero here; serialized as a flat object of the
/// six base keys.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserEmotionProfile(EmotionVector);

impl UserEmotionProfile {
    pub fn from_vector(vector: EmotionVector) -> Self {
        Self(vector.base_only())
    }

    pub fn get(&self, key: EmotionKey) -> f64 {
        self.0.get(key)
    }

    pub fn as_vector(&self) -> &EmotionVector {
        &self.0
    }
}

impl Serialize for UserEmotionProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EmotionKey::BASE.len()))?;
        for key in EmotionKey::BASE {
            map.serialize_entry(key.as_str(), &self.0.get(key))?;
        }
        map.end()
    }
}

/// Summary of a user's retained history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserStats {
    pub total_analyses: usize,
    pub total_movies: u64,
    pub emotion_profile: UserEmotionProfile,
}
