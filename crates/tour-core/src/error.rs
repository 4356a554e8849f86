use thiserror::Error;

#[derive(Debug, Error)]
pub enum TourError {
    #[error("not initialized: run 'tour init'")]
    NotInitialized,

    #[error("tour not found: {0}")]
    TourNotFound(String),

    #[error("invalid tour id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidTourId(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid placement: {0}")]
    InvalidPlacement(String),

    #[error("step hook failed: {0}")]
    Hook(String),

    #[error("store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TourError>;
