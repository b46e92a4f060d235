pub mod catalogue;
pub mod genre_emotions;
pub mod history;
pub mod matcher;
pub mod moods;
pub mod profile;
pub mod recommendations;

pub use recommendations::{EngineConfig, RecommendationEngine};
