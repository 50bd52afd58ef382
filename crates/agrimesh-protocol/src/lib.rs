//! Contract-Net negotiation for the Agrimesh farm simulation.
//!
//! Requesters broadcast a Call For Proposal, collect bids inside a bounded
//! window, award the round to the best bid, and wait for a completion
//! report. Everything travels as [`Message`] values over the in-memory
//! [`MessageBus`].
//!
//! # Modules
//!
//! - [`bus`] -- Agent registry and in-order message delivery
//! - [`cfp`] -- The CFP lifecycle state machine
//! - [`selection`] -- Deterministic winner selection
//! - [`requester`] -- Broadcast, collection, award, and completion
//! - [`responder`] -- Wire-message builders for the executor side
//! - [`consts`] -- Protocol timeouts
//!
//! [`Message`]: agrimesh_types::Message

pub mod bus;
pub mod cfp;
pub mod consts;
pub mod error;
pub mod requester;
pub mod responder;
pub mod selection;

pub use bus::MessageBus;
pub use consts::{EXECUTION_TIMEOUT, PROPOSAL_COLLECTION_TIMEOUT};
pub use error::ProtocolError;
pub use requester::{Completion, await_completion, collect_proposals, run_round};
pub use selection::select_winner;
