//! Error types for the negotiation protocol.

use agrimesh_types::{AgentId, CfpId, CfpStatus};
use thiserror::Error;

/// Errors raised while driving a negotiation round.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The collection window closed without a single proposal.
    #[error("cfp {cfp_id}: no proposals received")]
    NoProposals {
        /// The round that failed.
        cfp_id: CfpId,
    },

    /// A lifecycle move that the state machine does not allow.
    #[error("cfp {cfp_id}: invalid transition {from:?} -> {to:?}")]
    InvalidTransition {
        /// The round in question.
        cfp_id: CfpId,
        /// State before the attempted move.
        from: CfpStatus,
        /// The state that was requested.
        to: CfpStatus,
    },

    /// The awarded executor produced no completion report in time.
    #[error("cfp {cfp_id}: timed out waiting for completion")]
    ExecutionTimeout {
        /// The round that expired.
        cfp_id: CfpId,
    },

    /// A message was addressed to a name the bus has never seen.
    #[error("agent {id} is not registered on the bus")]
    UnknownAgent {
        /// The unknown name.
        id: AgentId,
    },

    /// The recipient's inbox was dropped.
    #[error("agent {id} is no longer receiving")]
    ChannelClosed {
        /// The unreachable recipient.
        id: AgentId,
    },
}
