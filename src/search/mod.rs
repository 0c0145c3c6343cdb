pub mod index;
pub mod ranking;

pub use index::{SchemeRecord, SimilarityIndex, Vectorizer};
pub use ranking::{RankingService, ScoredRecord};
