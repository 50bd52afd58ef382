//! Winner selection over collected proposals.
//!
//! Lowest ETA wins; ties fall to the lower resource cost, then to the
//! lexicographically smallest bidder name. The final tie-breaker is total,
//! so selection is deterministic for any set of bids.

use agrimesh_types::Proposal;

/// Pick the winning proposal, or `None` for an empty slate.
pub fn select_winner(proposals: &[Proposal]) -> Option<&Proposal> {
    proposals
        .iter()
        .min_by(|a, b| {
            a.eta_ticks
                .cmp(&b.eta_ticks)
                .then(a.resource_cost.cmp(&b.resource_cost))
                .then(a.bidder.cmp(&b.bidder))
        })
}
