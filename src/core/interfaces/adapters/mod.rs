mod similarity_scorer;

pub use similarity_scorer::SimilarityScorer;
