use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use policyseek::config::Config;
use policyseek::search::index::SimilarityIndex;
use policyseek::search::ranking::RankingService;
use policyseek::server::router::{AppState, app_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
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

    info!(
        database_url = %cfg.database_url,
        vectorizer_path = %cfg.vectorizer_path.display(),
        index_path = %cfg.index_path.display(),
        loglevel = %cfg.loglevel,
    );

    let storage = policyseek::db::connect(&cfg.database_url).await?;
    storage.init_schema().await?;

    let index = if cfg.vectorizer_path.exists() && cfg.index_path.exists() {
        match SimilarityIndex::load(&cfg.vectorizer_path, &cfg.index_path) {
            Ok(index) => {
                info!(schemes = index.schemes.len(), "similarity index loaded");
                Some(Arc::new(index))
            }
            Err(e) => {
                warn!(error = %e, "failed to load similarity index; serving fallback results");
                None
            }
        }
    } else {
        warn!(
            vectorizer_path = %cfg.vectorizer_path.display(),
            index_path = %cfg.index_path.display(),
            "artifact files not found; serving fallback results"
        );
        None
    };
    let ranking = Arc::new(RankingService::new(index));

    let state = AppState::new(storage, ranking, &cfg.session_secret);
    let app = app_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
