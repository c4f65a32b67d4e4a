use std::sync::atomic::{AtomicU32, Ordering};

use tracing::debug;

use crate::{Image, ImageClassifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Random,
    Fixed(bool),
}

/// Classifier that never inspects the image.
///
/// By default each call is a coin flip. Tests and demos pin the answer with
/// [`FakeImageClassifier::with_deterministic_result`].
#[derive(Debug)]
pub struct FakeImageClassifier {
    answer: Answer,
    /// `f32` bits of the threshold passed to the most recent call.
    last_threshold: AtomicU32,
}

impl Default for FakeImageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeImageClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self {
            answer: Answer::Random,
            last_threshold: AtomicU32::new(0.5_f32.to_bits()),
        }
    }

    /// Always answer `contains_cat` with `cat`.
    #[must_use]
    pub fn with_deterministic_result(mut self, cat: bool) -> Self {
        self.answer = Answer::Fixed(cat);
        self
    }

    /// Threshold passed to the most recent [`ImageClassifier::contains_cat`] call,
    /// or `0.5` if it has never been called.
    #[must_use]
    pub fn last_used_threshold(&self) -> f32 {
        f32::from_bits(self.last_threshold.load(Ordering::Acquire))
    }
}

impl ImageClassifier for FakeImageClassifier {
    fn contains_cat(&self, image: &Image, confidence_threshold: f32) -> bool {
        self.last_threshold
            .store(confidence_threshold.to_bits(), Ordering::Release);
        let cat = match self.answer {
            Answer::Fixed(cat) => cat,
            Answer::Random => rand::random::<bool>(),
        };
        debug!(
            bytes = image.len(),
            threshold = confidence_threshold,
            cat,
            "Classified image"
        );
        cat
    }
}
