//! CFP lifecycle state machine.
//!
//! Legal moves:
//!
//! ```text
//! Open -> CollectingProposals -> Assigned -> Executing -> Done
//!              |                     |           |-> Failed
//!              |-> Failed            |-> Failed
//!              |-> Expired                       |-> Expired
//! ```
//!
//! Terminal states accept no further moves.

use agrimesh_types::{Cfp, CfpStatus};

use crate::error::ProtocolError;

/// Whether the lifecycle allows moving from `from` to `to`.
pub const fn transition_allowed(from: CfpStatus, to: CfpStatus) -> bool {
    matches!(
        (from, to),
        (CfpStatus::Open, CfpStatus::CollectingProposals)
            | (
                CfpStatus::CollectingProposals,
                CfpStatus::Assigned | CfpStatus::Failed | CfpStatus::Expired
            )
            | (CfpStatus::Assigned, CfpStatus::Executing | CfpStatus::Failed)
            | (
                CfpStatus::Executing,
                CfpStatus::Done | CfpStatus::Failed | CfpStatus::Expired
            )
    )
}

/// Move a CFP to a new lifecycle state, or fail without touching it.
pub fn transition(cfp: &mut Cfp, to: CfpStatus) -> Result<(), ProtocolError> {
    if !transition_allowed(cfp.status, to) {
        return Err(ProtocolError::InvalidTransition { cfp_id: cfp.id, from: cfp.status, to });
    }
    cfp.status = to;
    Ok(())
}
