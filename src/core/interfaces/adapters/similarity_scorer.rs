use anyhow::Result;
use image::GrayImage;

pub trait SimilarityScorer: Send + Sync {
    /// Structural similarity of two equally sized grayscale images, roughly in [0, 1].
    fn score(&self, template: &GrayImage, region: &GrayImage) -> Result<f64>;
}
