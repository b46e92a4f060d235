mod analysis;
mod emotion;
mod movie;
mod query;

pub use analysis::{AnalysisRecord, UserEmotionProfile, UserId, UserStats};
pub use emotion::{EmotionKey, EmotionVector};
pub use movie::{Movie, MovieId, MovieSummary, ScoredMovie};
pub use query::{RecommendationQuery, MAX_RATING};
