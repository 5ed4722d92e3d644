use anyhow::{Context, Result};
use image::GrayImage;
use image_compare::Algorithm;

use crate::core::interfaces::adapters::SimilarityScorer;
use crate::global_constants::LOG_TAG_SIMILARITY;

/// Mean structural similarity backed by `image-compare`.
#[derive(Default)]
pub struct SsimSimilarityScorer;

impl SsimSimilarityScorer {
    pub fn new() -> Self {
        log::debug!("{} using MSSIM similarity scorer", LOG_TAG_SIMILARITY);
        Self
    }
}

impl SimilarityScorer for SsimSimilarityScorer {
    fn score(&self, template: &GrayImage, region: &GrayImage) -> Result<f64> {
        let similarity = image_compare::gray_similarity_structure(
            &Algorithm::MSSIMSimple,
            template,
            region,
        )
        .with_context(|| {
            format!(
                "failed to compare {}x{} template with {}x{} region",
                template.width(),
                template.height(),
                region.width(),
                region.height()
            )
        })?;

        log::trace!("{} raw score {:.4}", LOG_TAG_SIMILARITY, similarity.score);
        Ok(similarity.score)
    }
}
