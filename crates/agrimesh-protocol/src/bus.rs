//! In-memory message bus.
//!
//! A registry of unbounded channels, one inbox per agent name. Delivery is
//! in-order per sender-receiver pair and never blocks the sender. The bus
//! stands in for a real transport; nothing outside this module assumes
//! shared memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agrimesh_types::{AgentId, Envelope, Message};
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::ProtocolError;

/// Handle to the shared bus. Cheap to clone, one per agent task.
#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    inboxes: Arc<Mutex<HashMap<AgentId, mpsc::UnboundedSender<Envelope>>>>,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent and hand back its inbox.
    ///
    /// Re-registering a name replaces the previous inbox.
    pub fn register(&self, id: &AgentId) -> mpsc::UnboundedReceiver<Envelope> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut inboxes) = self.inboxes.lock() {
            inboxes.insert(id.clone(), tx);
        }
        rx
    }

    /// Deliver a message to one recipient.
    pub fn send(&self, from: &AgentId, to: &AgentId, message: Message) -> Result<(), ProtocolError> {
        let sender = self
            .inboxes
            .lock()
            .ok()
            .and_then(|inboxes| inboxes.get(to).cloned())
            .ok_or_else(|| ProtocolError::UnknownAgent { id: to.clone() })?;
        trace!(from = %from, to = %to, "bus delivery");
        sender
            .send(Envelope::new(from.clone(), message))
            .map_err(|_| ProtocolError::ChannelClosed { id: to.clone() })
    }

    /// Deliver a message to several recipients, skipping the sender itself.
    ///
    /// Returns the recipients that were actually reached.
    pub fn broadcast(
        &self,
        from: &AgentId,
        recipients: &[AgentId],
        message: &Message,
    ) -> Vec<AgentId> {
        let mut reached = Vec::with_capacity(recipients.len());
        for to in recipients {
            if to == from {
                continue;
            }
            if self.send(from, to, message.clone()).is_ok() {
                reached.push(to.clone());
            }
        }
        reached
    }
}
