use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// One dimension of an emotion vector
///
/// The first six keys are the base emotions produced by the review classifier,
/// the last four are platform-specific blends that users can ask for but that
/// are never folded into a user's aggregated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionKey {
    Joy,
    Sadness,
    Fear,
    Anger,
    Surprise,
    Disgust,
    Thrill,
    Romance,
    Humor,
    Inspiration,
}

impl EmotionKey {
    /// Every key, in canonical order
    pub const ALL: [EmotionKey; 10] = [
        EmotionKey::Joy,
        EmotionKey::Sadness,
        EmotionKey::Fear,
        EmotionKey::Anger,
        EmotionKey::Surprise,
        EmotionKey::Disgust,
        EmotionKey::Thrill,
        EmotionKey::Romance,
        EmotionKey::Humor,
        EmotionKey::Inspiration,
    ];

    pub const BASE: [EmotionKey; 6] = [
        EmotionKey::Joy,
        EmotionKey::Sadness,
        EmotionKey::Fear,
        EmotionKey::Anger,
        EmotionKey::Surprise,
        EmotionKey::Disgust,
    ];

    pub const EXTENDED: [EmotionKey; 4] = [
        EmotionKey::Thrill,
        EmotionKey::Romance,
        EmotionKey::Humor,
        EmotionKey::Inspiration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionKey::Joy => "joy",
            EmotionKey::Sadness => "sadness",
            EmotionKey::Fear => "fear",
            EmotionKey::Anger => "anger",
            EmotionKey::Surprise => "surprise",
            EmotionKey::Disgust => "disgust",
            EmotionKey::Thrill => "thrill",
            EmotionKey::Romance => "romance",
            EmotionKey::Humor => "humor",
            EmotionKey::Inspiration => "inspiration",
        }
    }

    pub fn is_base(&self) -> bool {
        self.index() < EmotionKey::BASE.len()
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for EmotionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmotionKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EmotionKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::InvalidQuery(format!("Unknown emotion '{}'", s)))
    }
}

/// Weight profile over the fixed emotion key set
///
/// Every key always has a value in `[0, 1]`; keys never set read as 0. The
/// values are independent weights and are not normalized to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "HashMap<String, f64>",
    into = "BTreeMap<EmotionKey, f64>"
)]
pub struct EmotionVector {
    values: [f64; 10],
}

impl EmotionVector {
    /// The all-zero vector
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a vector from fractional weights in `[0, 1]`
    ///
    /// Unknown keys and out-of-range values are rejected with a reason that
    /// names the offending key.
    pub fn from_fractions<'a, I>(weights: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        let mut vector = Self::empty();
        for (name, &value) in weights {
            let key: EmotionKey = name.parse()?;
            if !(0.0..=1.0).contains(&value) {
                return Err(AppError::InvalidQuery(format!(
                    "Emotion '{}' must be between 0 and 1, got {}",
                    key, value
                )));
            }
            vector.set(key, value);
        }
        Ok(vector)
    }

    /// Builds a vector from slider percentages (0-100), dividing each by 100
    pub fn from_percentages<'a, I>(percentages: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a u32)>,
    {
        let mut vector = Self::empty();
        for (name, &percent) in percentages {
            let key: EmotionKey = name.parse()?;
            if percent > 100 {
                return Err(AppError::InvalidQuery(format!(
                    "Emotion '{}' must be between 0 and 100 percent, got {}",
                    key, percent
                )));
            }
            vector.set(key, f64::from(percent) / 100.0);
        }
        Ok(vector)
    }

    /// Builds a vector from stored analysis scores
    ///
    /// Unknown labels (e.g. the classifier's `neutral`) are ignored, values
    /// are clamped into `[0, 1]` and NaN reads as 0.
    pub fn from_scores_clamped<I, S>(scores: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut vector = Self::empty();
        for (name, value) in scores {
            if let Ok(key) = name.as_ref().parse::<EmotionKey>() {
                vector.set(key, value);
            }
        }
        vector
    }

    pub fn get(&self, key: EmotionKey) -> f64 {
        self.values[key.index()]
    }

    /// Sets a key, clamping the value into `[0, 1]`
    pub fn set(&mut self, key: EmotionKey, value: f64) {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        self.values[key.index()] = value;
    }

    /// Builder-style variant of [`EmotionVector::set`]
    pub fn with(mut self, key: EmotionKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Iterates `(key, value)` over all ten keys in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (EmotionKey, f64)> + '_ {
        EmotionKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    /// True when no key carries any weight
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Copy with the extended keys zeroed
    pub fn base_only(&self) -> Self {
        self.filtered(EmotionKey::is_base)
    }

    /// Copy with the base keys zeroed
    pub fn extended_only(&self) -> Self {
        self.filtered(|key| !key.is_base())
    }

    /// Whether any extended key carries weight
    ///
    /// Catalogue entries analyzed for base emotions only have none.
    pub fn has_extended(&self) -> bool {
        EmotionKey::EXTENDED.into_iter().any(|key| self.get(key) > 0.0)
    }

    fn filtered(&self, keep: impl Fn(&EmotionKey) -> bool) -> Self {
        let mut vector = Self::empty();
        for (key, value) in self.iter().filter(|(key, _)| keep(key)) {
            vector.set(key, value);
        }
        vector
    }

    /// Strongest base emotion, earlier key wins on a tie
    ///
    /// Returns `None` when every base key is zero.
    pub fn dominant_base(&self) -> Option<EmotionKey> {
        EmotionKey::BASE
            .into_iter()
            .filter(|key| self.get(*key) > 0.0)
            .fold(None, |best: Option<EmotionKey>, key| match best {
                Some(b) if self.get(b) >= self.get(key) => Some(b),
                _ => Some(key),
            })
    }
}

impl TryFrom<HashMap<String, f64>> for EmotionVector {
    type Error = AppError;

    fn try_from(map: HashMap<String, f64>) -> Result<Self, Self::Error> {
        EmotionVector::from_fractions(&map)
    }
}

impl From<EmotionVector> for BTreeMap<EmotionKey, f64> {
    fn from(vector: EmotionVector) -> Self {
        vector.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_key_parsing_is_case_insensitive() {
        assert_eq!("Joy".parse::<EmotionKey>().unwrap(), EmotionKey::Joy);
        assert_eq!(" thrill ".parse::<EmotionKey>().unwrap(), EmotionKey::Thrill);
        assert!("neutral".parse::<EmotionKey>().is_err());
    }

    #[test]
    fn test_base_and_extended_partition() {
        assert!(EmotionKey::BASE.iter().all(EmotionKey::is_base));
        assert!(EmotionKey::EXTENDED.iter().all(|k| !k.is_base()));
    }

    #[test]
    fn test_from_fractions_fills_missing_keys_with_zero() {
        let vector = EmotionVector::from_fractions(&map(&[("joy", 0.8), ("thrill", 0.5)])).unwrap();
        assert_eq!(vector.get(EmotionKey::Joy), 0.8);
        assert_eq!(vector.get(EmotionKey::Thrill), 0.5);
        assert_eq!(vector.get(EmotionKey::Fear), 0.0);
        assert!((vector.total_weight() - 1.3).abs() < 1e-12);
    }

    #[test]
    fn test_from_fractions_rejects_out_of_range() {
        let err = EmotionVector::from_fractions(&map(&[("joy", 1.2)])).unwrap_err();
        assert!(matches!(err, AppError::InvalidQuery(_)));
        assert!(err.to_string().contains("joy"));

        assert!(EmotionVector::from_fractions(&map(&[("fear", -0.1)])).is_err());
        assert!(EmotionVector::from_fractions(&map(&[("fear", f64::NAN)])).is_err());
    }

    #[test]
    fn test_from_fractions_rejects_unknown_key() {
        let err = EmotionVector::from_fractions(&map(&[("boredom", 0.2)])).unwrap_err();
        assert!(err.to_string().contains("boredom"));
    }

    #[test]
    fn test_from_percentages_divides_by_hundred() {
        let sliders: HashMap<String, u32> =
            [("joy".to_string(), 80), ("romance".to_string(), 100)].into();
        let vector = EmotionVector::from_percentages(&sliders).unwrap();
        assert_eq!(vector.get(EmotionKey::Joy), 0.8);
        assert_eq!(vector.get(EmotionKey::Romance), 1.0);

        let too_high: HashMap<String, u32> = [("joy".to_string(), 101)].into();
        assert!(EmotionVector::from_percentages(&too_high).is_err());
    }

    #[test]
    fn test_from_scores_clamped_is_lenient() {
        let vector = EmotionVector::from_scores_clamped([
            ("joy", 1.5),
            ("neutral", 0.9),
            ("fear", -0.3),
            ("anger", f64::NAN),
            ("sadness", 0.25),
        ]);
        assert_eq!(vector.get(EmotionKey::Joy), 1.0);
        assert_eq!(vector.get(EmotionKey::Fear), 0.0);
        assert_eq!(vector.get(EmotionKey::Anger), 0.0);
        assert_eq!(vector.get(EmotionKey::Sadness), 0.25);
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(EmotionVector::empty().is_empty());
        assert!(EmotionVector::from_fractions(&map(&[("joy", 0.0)])).unwrap().is_empty());
        assert!(!EmotionVector::empty().with(EmotionKey::Humor, 0.1).is_empty());
    }

    #[test]
    fn test_base_and_extended_slices() {
        let vector = EmotionVector::empty()
            .with(EmotionKey::Joy, 0.4)
            .with(EmotionKey::Thrill, 0.7);

        assert_eq!(vector.base_only().get(EmotionKey::Joy), 0.4);
        assert_eq!(vector.base_only().get(EmotionKey::Thrill), 0.0);
        assert_eq!(vector.extended_only().get(EmotionKey::Joy), 0.0);
        assert_eq!(vector.extended_only().get(EmotionKey::Thrill), 0.7);
    }

    #[test]
    fn test_has_extended() {
        assert!(!EmotionVector::empty().with(EmotionKey::Joy, 0.9).has_extended());
        assert!(EmotionVector::empty().with(EmotionKey::Humor, 0.1).has_extended());
    }

    #[test]
    fn test_dominant_base_ignores_extended_and_prefers_earlier_key() {
        let vector = EmotionVector::empty()
            .with(EmotionKey::Fear, 0.6)
            .with(EmotionKey::Anger, 0.6)
            .with(EmotionKey::Thrill, 0.9);
        assert_eq!(vector.dominant_base(), Some(EmotionKey::Fear));
        assert_eq!(EmotionVector::empty().dominant_base(), None);
    }

    #[test]
    fn test_serde_uses_emotion_names() {
        let vector = EmotionVector::empty().with(EmotionKey::Joy, 0.5);
        let json = serde_json::to_value(vector).unwrap();
        assert_eq!(json["joy"], 0.5);
        assert_eq!(json["inspiration"], 0.0);
        assert_eq!(json.as_object().unwrap().len(), 10);

        let back: EmotionVector = serde_json::from_value(json).unwrap();
        assert_eq!(back, vector);

        let bad = serde_json::from_str::<EmotionVector>(r#"{"joy": 2.0}"#);
        assert!(bad.is_err());
    }
}
