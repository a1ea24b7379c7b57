pub mod app_config;
pub mod config;
pub mod slug;
pub mod tours;

pub use app_config::{AppConfig, BrowserBackend, Environment};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_SOURCE_URLS};
pub use slug::slugify;
pub use tours::{NormalizedTour, DEFAULT_CURRENCY, PROVIDER_TYPE, TOUR_SOURCE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
