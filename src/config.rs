use std::path::PathBuf;

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Runtime configuration, populated from defaults overlaid with
/// `POLICYSEEK_`-prefixed environment variables (a `.env` file is honored
/// via dotenvy before this is loaded). Constructed once in `main` and passed
/// explicitly to whatever needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub listen_addr: String,
    pub database_url: String,
    pub session_secret: String,
    pub vectorizer_path: PathBuf,
    pub index_path: PathBuf,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite:policyseek.sqlite".to_string(),
            // Development-only placeholder; override in any real deployment.
            session_secret: "insecure-dev-secret-change-me-in-production".to_string(),
            vectorizer_path: PathBuf::from("artifacts/vectorizer.json"),
            index_path: PathBuf::from("artifacts/index.json"),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let cfg: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("POLICYSEEK_"))
            .extract()?;

        // Cookie key derivation requires at least 32 bytes of secret material.
        if cfg.session_secret.len() < 32 {
            return Err(AppError::Config(figment::Error::from(
                "POLICYSEEK_SESSION_SECRET must be at least 32 bytes".to_string(),
            )));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_secret_length_check() {
        assert!(Config::default().session_secret.len() >= 32);
    }
}
