//! Emotion similarity scoring and the ranking order built on it.
//!
//! The score is a weighted overlap rather than a cosine: every key the user
//! asked for contributes `weight * movie_value`, and the total is divided by
//! the sum of the weights that count against the movie. Base emotions always
//! count. Extended emotions count whenever the movie has an extended analysis
//! at all; a movie analyzed for base emotions only is scored on the base keys
//! alone. Movie mass on keys the user did not ask for never affects the result.

use std::cmp::Ordering;

use crate::models::{EmotionVector, Movie, ScoredMovie};

/// Scores a movie's emotions against a user's requested weights
///
/// Returns a value in `[0, 1]`. A user vector with no weight, or a movie with
/// no mass on any requested key, scores exactly 0. When the movie has no
/// extended analysis, requested extended keys are left out of the denominator
/// instead of penalizing it.
pub fn score(user: &EmotionVector, movie: &EmotionVector) -> f64 {
    let movie_has_extended = movie.has_extended();
    let mut total_weight = 0.0;
    let mut matched = 0.0;

    for (key, weight) in user.iter().filter(|(_, w)| *w > 0.0) {
        if !key.is_base() && !movie_has_extended {
            continue;
        }
        let value = movie.get(key);
        total_weight += weight;
        matched += weight * value;
    }

    if total_weight == 0.0 {
        return 0.0;
    }

    (matched / total_weight).clamp(0.0, 1.0)
}

/// Total order used to rank scored movies, best first
///
/// Higher score wins, then higher rating, then the more recent release, then
/// the lower identifier. A missing rating or release date sorts after any
/// present one.
pub fn rank_order(a: &ScoredMovie, b: &ScoredMovie) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| compare_rating(&b.movie, &a.movie))
        .then_with(|| b.movie.release_date.cmp(&a.movie.release_date))
        .then_with(|| a.movie.id.cmp(&b.movie.id))
}

/// Orders by rating ascending, with an unrated movie below any rated one
pub fn compare_rating(a: &Movie, b: &Movie) -> Ordering {
    match (a.rating, b.rating) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Scores every candidate and sorts the result by [`rank_order`]
pub fn rank(user: &EmotionVector, candidates: Vec<Movie>) -> Vec<ScoredMovie> {
    let mut scored: Vec<ScoredMovie> = candidates
        .into_iter()
        .map(|movie| ScoredMovie {
            score: score(user, &movie.emotions),
            movie,
        })
        .collect();

    scored.sort_by(rank_order);
    scored
}
