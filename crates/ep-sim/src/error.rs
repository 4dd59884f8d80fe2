use thiserror::Error;

use ep_bus::BusError;
use ep_core::{AgentId, CoreError, Tick};
use ep_world::WorldError;

use crate::{Field, RunState};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("at {tick}: {source}")]
    Commit {
        tick:   Tick,
        #[source]
        source: WorldError,
    },

    #[error("at {tick}: conflicting {field} requests for {agent}: {first} vs {second}")]
    Conflict {
        tick:   Tick,
        agent:  AgentId,
        field:  Field,
        first:  String,
        second: String,
    },

    #[error("at {tick}: {request} from {module:?} targets {agent}, which is dead")]
    DeadAgent {
        tick:    Tick,
        agent:   AgentId,
        module:  String,
        request: String,
    },

    #[error("at {tick}: {request} from {module:?} targets unknown {agent}")]
    UnknownAgent {
        tick:    Tick,
        agent:   AgentId,
        module:  String,
        request: String,
    },

    #[error("at {tick}: {agent} may not be at {location} while doing {activity}")]
    NotPermitted {
        tick:     Tick,
        agent:    AgentId,
        activity: String,
        location: String,
    },

    #[error("operation needs run state {expected:?}, engine is {actual:?}")]
    State {
        expected: RunState,
        actual:   RunState,
    },
}

pub type SimResult<T> = Result<T, SimError>;
