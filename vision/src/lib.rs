//! Camera images and cat classification.
//!
//! The core only needs one capability: "does this image contain a cat at this
//! confidence?". [`ImageClassifier`] is that seam. [`FakeImageClassifier`]
//! answers it without looking at pixels, which is all the simulation needs.

mod fake;
mod image;

pub use fake::FakeImageClassifier;
pub use image::Image;

/// Confidence threshold, on a 0–100 scale, used for every classification the
/// security service requests.
pub const CAT_CONFIDENCE_THRESHOLD: f32 = 50.0;

pub trait ImageClassifier: Send + Sync {
    /// `true` if `image` contains a cat with at least `confidence_threshold`
    /// percent confidence.
    fn contains_cat(&self, image: &Image, confidence_threshold: f32) -> bool;
}
