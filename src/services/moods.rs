use crate::models::{EmotionKey, EmotionVector};

use EmotionKey::*;

const MOODS: &[(&str, &[(EmotionKey, f64)])] = &[
    ("happy", &[(Joy, 1.0)]),
    ("joyful", &[(Joy, 1.0)]),
    ("cheerful", &[(Joy, 1.0)]),
    ("scary", &[(Fear, 1.0), (Thrill, 0.8)]),
    ("terrifying", &[(Fear, 1.0)]),
    ("horror", &[(Fear, 1.0)]),
    ("thrilling", &[(Thrill, 1.0), (Surprise, 0.6)]),
    ("exciting", &[(Thrill, 0.8), (Surprise, 0.7)]),
    ("suspenseful", &[(Fear, 0.6), (Surprise, 0.8)]),
    ("sad", &[(Sadness, 1.0)]),
    ("emotional", &[(Sadness, 0.7), (Joy, 0.5)]),
    ("tearjerker", &[(Sadness, 0.9)]),
    ("romantic", &[(Romance, 1.0), (Joy, 0.6)]),
    ("love", &[(Romance, 1.0)]),
    ("funny", &[(Humor, 1.0), (Joy, 0.8)]),
    ("comedy", &[(Humor, 1.0)]),
    ("hilarious", &[(Humor, 1.0)]),
    ("inspiring", &[(Inspiration, 1.0), (Joy, 0.6)]),
    ("motivational", &[(Inspiration, 1.0)]),
    ("uplifting", &[(Inspiration, 0.8), (Joy, 0.7)]),
    ("angry", &[(Anger, 1.0)]),
    ("intense", &[(Anger, 0.7), (Thrill, 0.7)]),
    ("surprising", &[(Surprise, 1.0)]),
    ("mindblowing", &[(Surprise, 1.0), (Inspiration, 0.5)]),
];

/// Weight used for moods that have no preset
const UNKNOWN_MOOD_JOY: f64 = 0.5;

/// Translates a mood keyword into query weights
///
/// Matching is case-insensitive and ignores surrounding whitespace. Unknown
/// moods fall back to a mild joy query rather than failing.
pub fn mood_emotions(mood: &str) -> EmotionVector {
    let mood = mood.trim();
    let weights = MOODS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(mood))
        .map(|(_, weights)| *weights);

    match weights {
        Some(weights) => weights
            .iter()
            .fold(EmotionVector::empty(), |v, &(key, value)| v.with(key, value)),
        None => {
            tracing::debug!(mood = %mood, "No preset for mood, using default");
            EmotionVector::empty().with(Joy, UNKNOWN_MOOD_JOY)
        }
    }
}

/// Names of all moods with a preset
pub fn known_moods() -> impl Iterator<Item = &'static str> {
    MOODS.iter().map(|(name, _)| *name)
}
