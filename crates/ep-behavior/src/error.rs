use thiserror::Error;

use ep_core::CoreError;

#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("transition matrix error: {0}")]
    Matrix(String),

    #[error("zero-sum row: age class {age_class}, bucket {bucket}, from activity {from}")]
    ZeroRow {
        age_class: u16,
        bucket:    u32,
        from:      u16,
    },

    #[error("transition matrix parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
