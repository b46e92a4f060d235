//! User emotion profile aggregation.
//!
//! Profiles are recomputed in full from whatever history the store returns
//! (the store owns retention). This only reads, so concurrent appends for the
//! same user need no coordination; the cost is linear in the retained history.

use crate::models::{AnalysisRecord, EmotionKey, EmotionVector, UserEmotionProfile, UserStats};

/// Averages the base emotions across a user's history
///
/// An empty history yields the all-zero profile. Extended emotions are never
/// part of a profile.
pub fn aggregate(history: &[AnalysisRecord]) -> UserEmotionProfile {
    let mut means = EmotionVector::empty();

    for key in EmotionKey::BASE {
        // Running mean: a history of identical values reproduces that value exactly
        let mut mean = 0.0;
        for (seen, record) in history.iter().enumerate() {
            let value = record.emotions.get(key);
            mean += (value - mean) / (seen + 1) as f64;
        }
        means.set(key, mean);
    }

    UserEmotionProfile::from_vector(means)
}

/// Totals and profile over a user's history
pub fn stats(history: &[AnalysisRecord]) -> UserStats {
    UserStats {
        total_analyses: history.len(),
        total_movies: history.iter().map(|r| u64::from(r.movie_count)).sum(),
        emotion_profile: aggregate(history),
    }
}
