use thiserror::Error;

use ep_world::WorldError;

use crate::Topic;

/// Errors raised by a module's handler.  Any of these aborts the tick.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error("module configuration error: {0}")]
    Config(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

pub type ModuleResult<T> = Result<T, ModuleError>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("unknown topic pattern {0:?}")]
    UnknownPattern(String),

    #[error("pattern {0:?} matches request topics; only notify.* topics can be subscribed")]
    NotSubscribable(String),

    #[error("module {module:?} failed handling {topic}: {source}")]
    Handler {
        module: String,
        topic:  Topic,
        #[source]
        source: ModuleError,
    },

    #[error("module {module:?} failed reviewing queued requests: {source}")]
    Review {
        module: String,
        #[source]
        source: ModuleError,
    },

    #[error("duplicate module name {0:?}")]
    DuplicateModule(String),
}

pub type BusResult<T> = Result<T, BusError>;
