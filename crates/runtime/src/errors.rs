//! Errors surfaced by the runtime API.
//!
//! Inside `think` these are logged and repaired rather than returned: an
//! agent's bad bookkeeping must never stop the rest of the simulation.

use ai_core::{AiError, EntityId, ErrorSeverity, PowerRef, ProfileRef};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("{0} not found in the profile catalog")]
    ProfileNotFound(ProfileRef),

    #[error("agent {0} is not in the world")]
    AgentNotInWorld(EntityId),

    #[error("substate stack is full at depth {depth}")]
    SubstateOverflow { depth: usize },

    #[error("pop_substate called with no substate pushed")]
    SubstateUnderflow,

    #[error("agent {agent} finished think at substate depth {depth}")]
    UnbalancedSubstates { agent: EntityId, depth: usize },

    #[error("agent {agent} is in a power state but no context matches {power:?}")]
    PowerDesync {
        agent: EntityId,
        power: Option<PowerRef>,
    },
}

impl AiError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ProfileNotFound(_) => ErrorSeverity::Fatal,
            Self::AgentNotInWorld(_) => ErrorSeverity::Recoverable,
            Self::SubstateOverflow { .. }
            | Self::SubstateUnderflow
            | Self::UnbalancedSubstates { .. }
            | Self::PowerDesync { .. } => ErrorSeverity::Internal,
        }
    }

    fn agent(&self) -> Option<EntityId> {
        match self {
            Self::AgentNotInWorld(agent)
            | Self::UnbalancedSubstates { agent, .. }
            | Self::PowerDesync { agent, .. } => Some(*agent),
            _ => None,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ProfileNotFound(_) => "profile_not_found",
            Self::AgentNotInWorld(_) => "agent_not_in_world",
            Self::SubstateOverflow { .. } => "substate_overflow",
            Self::SubstateUnderflow => "substate_underflow",
            Self::UnbalancedSubstates { .. } => "unbalanced_substates",
            Self::PowerDesync { .. } => "power_desync",
        }
    }
}
