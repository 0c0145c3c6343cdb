pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod search;
pub mod server;

pub use error::AppError;
pub use search::index::SimilarityIndex;
pub use search::ranking::RankingService;
