use thiserror::Error;

use ep_core::{ActivityId, AgentId, CoreError, HealthId, LocationId};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("world configuration error: {0}")]
    Config(String),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("unknown location {0}")]
    UnknownLocation(LocationId),

    #[error("unknown activity {0}")]
    UnknownActivity(ActivityId),

    #[error("unknown health state {0}")]
    UnknownHealth(HealthId),

    #[error("{agent} may not be at {location} while doing {activity}")]
    NotPermitted {
        agent:    AgentId,
        activity: ActivityId,
        location: LocationId,
    },

    #[error("illegal health transition for {agent}: {from} -> {to}")]
    IllegalTransition {
        agent: AgentId,
        from:  String,
        to:    String,
    },

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WorldResult<T> = Result<T, WorldError>;
