use thiserror::Error;

use ep_core::CoreError;
use ep_world::WorldError;

#[derive(Debug, Error)]
pub enum DiseaseError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("disease configuration error: {0}")]
    Config(String),

    #[error("disease parameter JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DiseaseResult<T> = Result<T, DiseaseError>;
