//! Protocol timing constants.

use std::time::Duration;

/// How long a requester waits for proposals before judging the round.
pub const PROPOSAL_COLLECTION_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a requester waits for a completion report after awarding.
pub const EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);
