//! Offline index builder: fits the TF-IDF vectorizer over a JSON scheme
//! catalog and writes the two artifact files the server loads at startup.
//!
//! Usage: `policyseek-index <catalog.json>` (output paths come from the
//! same configuration the server uses).

use std::fs;

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use policyseek::config::Config;
use policyseek::search::index::{SchemeRecord, SimilarityIndex};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let catalog_path = std::env::args()
        .nth(1)
        .ok_or("usage: policyseek-index <catalog.json>")?;

    let schemes: Vec<SchemeRecord> = serde_json::from_str(&fs::read_to_string(&catalog_path)?)?;
    info!(catalog = %catalog_path, schemes = schemes.len(), "fitting vectorizer");

    let index = SimilarityIndex::build(schemes);
    index.save(&cfg.vectorizer_path, &cfg.index_path)?;

    info!(
        vectorizer_path = %cfg.vectorizer_path.display(),
        index_path = %cfg.index_path.display(),
        vocabulary = index.vectorizer.dimension(),
        "artifacts written"
    );
    Ok(())
}
