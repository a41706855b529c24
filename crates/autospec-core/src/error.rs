use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("predefined spec must be a JSON object: {0}")]
    NotAnObject(PathBuf),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize spec: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write spec to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read project file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse project file: {0}")]
    Toml(#[from] toml::de::Error),
}
