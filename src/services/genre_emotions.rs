use crate::models::{EmotionKey, EmotionVector};

use EmotionKey::*;

/// Typical emotional signature of each catalogue genre
const GENRE_EMOTIONS: &[(&str, &[(EmotionKey, f64)])] = &[
    ("Action", &[(Thrill, 0.8), (Fear, 0.4), (Surprise, 0.6), (Anger, 0.3), (Joy, 0.5)]),
    ("Adventure", &[(Joy, 0.7), (Thrill, 0.7), (Surprise, 0.6), (Inspiration, 0.5)]),
    ("Animation", &[(Joy, 0.8), (Humor, 0.6), (Surprise, 0.4)]),
    ("Comedy", &[(Joy, 0.9), (Humor, 0.9), (Surprise, 0.3)]),
    ("Crime", &[(Fear, 0.5), (Anger, 0.6), (Thrill, 0.6), (Sadness, 0.3)]),
    ("Documentary", &[(Inspiration, 0.5), (Surprise, 0.3), (Sadness, 0.2)]),
    ("Drama", &[(Sadness, 0.6), (Joy, 0.3), (Anger, 0.3), (Inspiration, 0.4)]),
    ("Family", &[(Joy, 0.8), (Humor, 0.5), (Romance, 0.3)]),
    ("Fantasy", &[(Joy, 0.6), (Surprise, 0.7), (Thrill, 0.5), (Inspiration, 0.5)]),
    ("History", &[(Sadness, 0.4), (Inspiration, 0.5), (Anger, 0.3)]),
    ("Horror", &[(Fear, 0.9), (Disgust, 0.5), (Surprise, 0.6), (Thrill, 0.8)]),
    ("Music", &[(Joy, 0.8), (Romance, 0.4), (Inspiration, 0.6)]),
    ("Mystery", &[(Fear, 0.5), (Surprise, 0.7), (Thrill, 0.6)]),
    ("Romance", &[(Romance, 0.9), (Joy, 0.7), (Sadness, 0.3)]),
    ("Science Fiction", &[(Thrill, 0.6), (Surprise, 0.7), (Fear, 0.4), (Inspiration, 0.5)]),
    ("TV Movie", &[(Joy, 0.4), (Sadness, 0.3)]),
    ("Thriller", &[(Fear, 0.7), (Thrill, 0.9), (Surprise, 0.6), (Anger, 0.4)]),
    ("War", &[(Anger, 0.6), (Sadness, 0.7), (Fear, 0.5)]),
    ("Western", &[(Thrill, 0.6), (Anger, 0.4), (Joy, 0.3)]),
];

/// Mild profile for movies with no recognised genre
const NEUTRAL: &[(EmotionKey, f64)] = &[
    (Joy, 0.3),
    (Sadness, 0.2),
    (Fear, 0.2),
    (Anger, 0.1),
    (Surprise, 0.2),
    (Disgust, 0.1),
    (Thrill, 0.2),
    (Romance, 0.2),
    (Humor, 0.2),
    (Inspiration, 0.2),
];

/// Estimates an emotion vector from genre names
///
/// Used for catalogue entries that were never run through review analysis.
/// Each key takes the strongest value any of the movie's genres assigns it.
pub fn emotions_from_genres<S: AsRef<str>>(genres: &[S]) -> EmotionVector {
    let mut vector = EmotionVector::empty();
    let mut recognised = false;

    for genre in genres {
        let Some((_, emotions)) = GENRE_EMOTIONS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(genre.as_ref()))
        else {
            continue;
        };

        recognised = true;
        for &(key, value) in emotions.iter() {
            vector.set(key, vector.get(key).max(value));
        }
    }

    if !recognised {
        return NEUTRAL
            .iter()
            .fold(EmotionVector::empty(), |v, &(key, value)| v.with(key, value));
    }

    vector
}
