use crate::present;
use crate::upload::UploadedImage;
use chrono::{DateTime, Local};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Skin type labels the classifier may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkinType {
    Dry,
    Normal,
    Oily,
}

impl SkinType {
    pub const ALL: [SkinType; 3] = [SkinType::Dry, SkinType::Normal, SkinType::Oily];

    pub fn as_str(self) -> &'static str {
        match self {
            SkinType::Dry => "Dry",
            SkinType::Normal => "Normal",
            SkinType::Oily => "Oily",
        }
    }
}

impl fmt::Display for SkinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkinType {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" => Ok(SkinType::Dry),
            "normal" => Ok(SkinType::Normal),
            "oily" => Ok(SkinType::Oily),
            _ => Err(ClassificationError::UnknownLabel(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("unknown skin type label: {0:?}")]
    UnknownLabel(String),
    #[error("confidence {0} outside [0, 1]")]
    ConfidenceOutOfRange(f32),
    #[error("classification failed: {0}")]
    Failed(String),
}

/// What a classifier hands back for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub skin_type: SkinType,
    /// Confidence in [0,1].
    pub confidence: f32,
    pub produced_at: DateTime<Local>,
}

impl ClassificationOutcome {
    pub fn new(
        skin_type: SkinType,
        confidence: f32,
        produced_at: DateTime<Local>,
    ) -> Result<Self, ClassificationError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ClassificationError::ConfidenceOutOfRange(confidence));
        }
        Ok(Self {
            skin_type,
            confidence,
            produced_at,
        })
    }

    /// Build an outcome from a free-form label, e.g. one returned by a remote service.
    pub fn from_label(
        label: &str,
        confidence: f32,
        produced_at: DateTime<Local>,
    ) -> Result<Self, ClassificationError> {
        Self::new(label.parse()?, confidence, produced_at)
    }
}

/// A completed run as the session keeps it. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub skin_type: SkinType,
    pub confidence: f32,
    /// Local time of the run, already formatted for display.
    pub timestamp: String,
}

impl From<ClassificationOutcome> for ClassificationResult {
    fn from(outcome: ClassificationOutcome) -> Self {
        Self {
            skin_type: outcome.skin_type,
            confidence: outcome.confidence,
            timestamp: present::format_timestamp(&outcome.produced_at),
        }
    }
}

/// The inference collaborator. The session calls it once per run, after the
/// simulated delay has elapsed.
pub trait SkinClassifier {
    fn classify(
        &mut self,
        image: &UploadedImage,
    ) -> Result<ClassificationOutcome, ClassificationError>;
}

/// Source of the uniform index used by [`MockClassifier`].
pub trait RandomSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Thread-local RNG from `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Paired label/confidence table the mock draws from.
pub const MOCK_OUTCOMES: [(SkinType, f32); 3] = [
    (SkinType::Dry, 0.89),
    (SkinType::Normal, 0.92),
    (SkinType::Oily, 0.85),
];

/// Stand-in classifier: ignores the pixels and draws one entry of
/// [`MOCK_OUTCOMES`] uniformly at random.
#[derive(Debug, Default, Clone)]
pub struct MockClassifier<R = ThreadRandom> {
    random: R,
}

impl<R: RandomSource> MockClassifier<R> {
    pub fn new(random: R) -> Self {
        Self { random }
    }
}

impl<R: RandomSource> SkinClassifier for MockClassifier<R> {
    fn classify(
        &mut self,
        image: &UploadedImage,
    ) -> Result<ClassificationOutcome, ClassificationError> {
        let idx = self.random.pick(MOCK_OUTCOMES.len());
        let (skin_type, confidence) = MOCK_OUTCOMES.get(idx).copied().ok_or_else(|| {
            ClassificationError::Failed(format!("random index {idx} out of range"))
        })?;
        tracing::debug!(
            "mock classification of {} ({} bytes): {skin_type} {confidence}",
            image.name,
            image.size()
        );
        ClassificationOutcome::new(skin_type, confidence, Local::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewId;
    use crate::upload::{CandidateFile, validate};
    use approx::assert_relative_eq;
    use rstest::rstest;

    struct Fixed(usize);

    impl RandomSource for Fixed {
        fn pick(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    fn photo() -> UploadedImage {
        validate(
            CandidateFile::new("wajah.jpg", "image/jpeg", vec![0u8; 64]),
            PreviewId::new(1),
        )
        .unwrap()
    }

    #[rstest]
    #[case(0, SkinType::Dry, 0.89)]
    #[case(1, SkinType::Normal, 0.92)]
    #[case(2, SkinType::Oily, 0.85)]
    fn mock_pairs_label_with_fixed_confidence(
        #[case] idx: usize,
        #[case] expected: SkinType,
        #[case] confidence: f32,
    ) {
        let mut classifier = MockClassifier::new(Fixed(idx));
        let outcome = classifier.classify(&photo()).unwrap();
        assert_eq!(outcome.skin_type, expected);
        assert_relative_eq!(outcome.confidence, confidence);
    }

    #[test]
    fn mock_reports_out_of_range_pick_as_failure() {
        let mut classifier = MockClassifier::new(Fixed(3));
        let err = classifier.classify(&photo()).unwrap_err();
        assert!(matches!(err, ClassificationError::Failed(_)));
    }

    #[test]
    fn thread_random_stays_in_table() {
        let mut classifier = MockClassifier::<ThreadRandom>::default();
        for _ in 0..50 {
            let outcome = classifier.classify(&photo()).unwrap();
            let paired = MOCK_OUTCOMES
                .iter()
                .find(|(label, _)| *label == outcome.skin_type)
                .map(|(_, c)| *c)
                .unwrap();
            assert_relative_eq!(outcome.confidence, paired);
        }
    }

    #[rstest]
    #[case("dry", SkinType::Dry)]
    #[case("Normal", SkinType::Normal)]
    #[case(" OILY ", SkinType::Oily)]
    fn labels_parse_case_insensitively(#[case] raw: &str, #[case] expected: SkinType) {
        assert_eq!(raw.parse::<SkinType>().unwrap(), expected);
    }

    #[test]
    fn unknown_label_is_an_error() {
        let err = ClassificationOutcome::from_label("combination", 0.7, Local::now()).unwrap_err();
        assert_eq!(err, ClassificationError::UnknownLabel("combination".into()));
    }

    #[rstest]
    #[case(-0.01)]
    #[case(1.5)]
    #[case(f32::NAN)]
    fn confidence_must_be_a_probability(#[case] confidence: f32) {
        let err = ClassificationOutcome::new(SkinType::Dry, confidence, Local::now()).unwrap_err();
        assert!(matches!(err, ClassificationError::ConfidenceOutOfRange(_)));
    }
}
