//! Error types for agent-side bookkeeping.

use agrimesh_types::ResourceKind;
use thiserror::Error;

/// Errors raised by inventory and battery operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AgentError {
    /// A withdrawal asked for more of a material than the agent holds.
    #[error("insufficient {kind:?}: needed {needed}, available {available}")]
    InsufficientResource {
        /// The material in question.
        kind: ResourceKind,
        /// How much the operation needed.
        needed: u32,
        /// How much the agent actually holds.
        available: u32,
    },

    /// The agent does not carry this material at all.
    #[error("resource {kind:?} is not part of this agent's inventory")]
    UnknownResource {
        /// The material in question.
        kind: ResourceKind,
    },
}
