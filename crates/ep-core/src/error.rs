//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, keeping error sites clean.

use thiserror::Error;

/// Errors raised while validating run-level configuration or labels.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown {kind} label {name:?}")]
    UnknownLabel { kind: &'static str, name: String },

    #[error("duplicate {kind} label {name:?}")]
    DuplicateLabel { kind: &'static str, name: String },
}

/// Shorthand result type for `ep-core`.
pub type CoreResult<T> = Result<T, CoreError>;
