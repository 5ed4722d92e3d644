mod filesystem_flagged_store;
mod ssim_similarity_scorer;

pub use filesystem_flagged_store::FilesystemFlaggedStore;
pub use ssim_similarity_scorer::SsimSimilarityScorer;
