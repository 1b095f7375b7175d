use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod seeds;
pub mod slug;
pub mod types;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid display style: {0}")]
    InvalidDisplayStyle(String),
    #[error("invalid input type: {0}")]
    InvalidInputType(String),
    #[error("invalid image position: {0}")]
    InvalidImagePosition(String),
    #[error("invalid image layout: {0}")]
    InvalidImageLayout(String),
    #[error("invalid border style: {0}")]
    InvalidBorderStyle(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[from] serde_yaml::Error),
    #[error("seed file validation failed: {0}")]
    Validation(String),
}

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use seeds::{load_seed_file, SeedField, SeedFile, SeedSet};
pub use slug::{set_matches, slugify, VariantKey};
pub use types::{
    BorderStyle, DisplayStyle, ImageLayout, ImagePosition, InputType, PlanLimits, PlanTier,
};
