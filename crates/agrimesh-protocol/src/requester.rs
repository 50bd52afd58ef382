//! Requester side of a Contract-Net round.
//!
//! The requester broadcasts its CFP, collects proposals inside a bounded
//! window (leaving early once every reached bidder has answered), awards
//! the round with fire-and-forget accept/reject notices, and finally waits
//! for a completion report from the winner.

use std::time::Duration;

use agrimesh_types::{
    Cfp, CfpId, CfpRequest, CfpStatus, CropKind, Envelope, Message, Proposal, TaskReport,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, trace, warn};

use crate::bus::MessageBus;
use crate::cfp;
use crate::error::ProtocolError;
use crate::selection;

/// How an awarded round ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// The winner reported success.
    Done {
        /// For plant/harvest tasks, the crop involved.
        seed_type: Option<CropKind>,
        /// Structured completion details.
        details: TaskReport,
    },
    /// The winner reported failure; nothing was consumed on its side.
    Failed {
        /// The winner's stated reason.
        reason: String,
    },
}

/// Collect proposals for a CFP from the inbox.
///
/// Returns when every expected bidder has answered or the window closes,
/// whichever comes first. Messages for other rounds arriving during the
/// window are dropped with a trace.
pub async fn collect_proposals(
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    cfp_id: CfpId,
    expected_bidders: usize,
    window: Duration,
) -> Vec<Proposal> {
    let deadline = Instant::now() + window;
    let mut proposals = Vec::with_capacity(expected_bidders);
    while proposals.len() < expected_bidders {
        let Ok(received) = timeout_at(deadline, inbox.recv()).await else {
            debug!(cfp_id = %cfp_id, received = proposals.len(), "collection window closed");
            break;
        };
        let Some(envelope) = received else { break };
        match envelope.message {
            Message::ProposeTask { cfp_id: id, eta_ticks, battery_lost, resource_cost }
                if id == cfp_id =>
            {
                proposals.push(Proposal {
                    cfp_id,
                    bidder: envelope.from,
                    eta_ticks,
                    resource_cost,
                    energy_cost: battery_lost,
                });
            }
            Message::ProposeRecharge { cfp_id: id, eta_ticks, battery_lost, .. }
                if id == cfp_id =>
            {
                proposals.push(Proposal {
                    cfp_id,
                    bidder: envelope.from,
                    eta_ticks,
                    resource_cost: 0,
                    energy_cost: battery_lost,
                });
            }
            other => {
                trace!(cfp_id = %cfp_id, from = %envelope.from, message = ?other,
                    "ignoring message during collection");
            }
        }
    }
    proposals
}

/// Drive one negotiation round up to the award.
///
/// On success the CFP sits in [`CfpStatus::Executing`] and the winning
/// proposal is returned. With an empty slate the CFP moves to
/// [`CfpStatus::Failed`] and the round errors with
/// [`ProtocolError::NoProposals`].
pub async fn run_round(
    bus: &MessageBus,
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    cfp: &mut Cfp,
    bidders: &[agrimesh_types::AgentId],
    window: Duration,
) -> Result<Proposal, ProtocolError> {
    cfp::transition(cfp, CfpStatus::CollectingProposals)?;
    let call = match &cfp.request {
        CfpRequest::Task { .. } => Message::CfpTask { cfp: cfp.clone() },
        CfpRequest::Recharge { .. } => Message::CfpRecharge { cfp: cfp.clone() },
    };
    let reached = bus.broadcast(&cfp.requester, bidders, &call);
    info!(cfp_id = %cfp.id, bidders = reached.len(), "cfp broadcast");

    let proposals = collect_proposals(inbox, cfp.id, reached.len(), window).await;
    let Some(winner) = selection::select_winner(&proposals).cloned() else {
        cfp::transition(cfp, CfpStatus::Failed)?;
        warn!(cfp_id = %cfp.id, "no proposals");
        return Err(ProtocolError::NoProposals { cfp_id: cfp.id });
    };

    cfp::transition(cfp, CfpStatus::Assigned)?;
    for proposal in &proposals {
        let decision = if proposal.bidder == winner.bidder {
            Message::AcceptProposal { cfp_id: cfp.id, decision: "accepted".into() }
        } else {
            Message::RejectProposal { cfp_id: cfp.id, decision: "rejected".into() }
        };
        // Fire-and-forget: a bidder that vanished after bidding is not
        // this round's problem.
        if bus.send(&cfp.requester, &proposal.bidder, decision).is_err() {
            warn!(cfp_id = %cfp.id, bidder = %proposal.bidder, "decision undeliverable");
        }
    }
    cfp::transition(cfp, CfpStatus::Executing)?;
    info!(cfp_id = %cfp.id, winner = %winner.bidder, eta = winner.eta_ticks, "round awarded");
    Ok(winner)
}

/// Wait for the winner's completion report.
///
/// Moves the CFP to its terminal state. A silent winner expires the round.
pub async fn await_completion(
    inbox: &mut mpsc::UnboundedReceiver<Envelope>,
    cfp: &mut Cfp,
    window: Duration,
) -> Result<Completion, ProtocolError> {
    let deadline = Instant::now() + window;
    loop {
        let Ok(received) = timeout_at(deadline, inbox.recv()).await else {
            cfp::transition(cfp, CfpStatus::Expired)?;
            return Err(ProtocolError::ExecutionTimeout { cfp_id: cfp.id });
        };
        let Some(envelope) = received else {
            cfp::transition(cfp, CfpStatus::Expired)?;
            return Err(ProtocolError::ExecutionTimeout { cfp_id: cfp.id });
        };
        match envelope.message {
            Message::Done { cfp_id, seed_type, details, .. } if cfp_id == cfp.id => {
                cfp::transition(cfp, CfpStatus::Done)?;
                return Ok(Completion::Done { seed_type, details });
            }
            Message::Failure { cfp_id, reason, .. } if cfp_id == cfp.id => {
                cfp::transition(cfp, CfpStatus::Failed)?;
                return Ok(Completion::Failed { reason });
            }
            other => {
                trace!(cfp_id = %cfp.id, message = ?other, "ignoring message while executing");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agrimesh_types::{
        AgentId, GridPos, Priority, ResourceKind, ResourceRequirement, TaskKind, TaskStatus, Zone,
    };

    fn water_cfp(requester: &AgentId) -> Cfp {
        Cfp::new(
            requester.clone(),
            CfpRequest::Task {
                task: TaskKind::Irrigation,
                zone: Zone::Cell { pos: GridPos::new(0, 0) },
                dose: None,
                seed_kind: None,
            },
            vec![ResourceRequirement::new(ResourceKind::Water, 20)],
            Priority::High,
        )
    }

    /// Spawn a bidder that answers every CFP with a fixed ETA.
    fn spawn_bidder(bus: &MessageBus, name: &str, eta_ticks: u32) -> AgentId {
        let id = AgentId::from(name);
        let mut inbox = bus.register(&id);
        let bus = bus.clone();
        let me = id.clone();
        tokio::spawn(async move {
            while let Some(envelope) = inbox.recv().await {
                if let Message::CfpTask { cfp } = envelope.message {
                    let reply = Message::ProposeTask {
                        cfp_id: cfp.id,
                        eta_ticks,
                        battery_lost: 1.0,
                        resource_cost: 20,
                    };
                    if bus.send(&me, &cfp.requester, reply).is_err() {
                        break;
                    }
                }
            }
        });
        id
    }

    #[tokio::test]
    async fn round_awards_the_fastest_bidder() {
        let bus = MessageBus::new();
        let requester = AgentId::from("soil-sensor-0");
        let mut inbox = bus.register(&requester);
        let bidders = vec![
            spawn_bidder(&bus, "irrigation-a", 5),
            spawn_bidder(&bus, "irrigation-b", 3),
            spawn_bidder(&bus, "irrigation-c", 3),
        ];

        let mut cfp = water_cfp(&requester);
        let winner = run_round(&bus, &mut inbox, &mut cfp, &bidders, Duration::from_secs(3))
            .await
            .map(|p| p.bidder);
        assert_eq!(winner, Ok(AgentId::from("irrigation-b")));
        assert_eq!(cfp.status, CfpStatus::Executing);
    }

    #[tokio::test]
    async fn empty_slate_fails_the_round() {
        let bus = MessageBus::new();
        let requester = AgentId::from("soil-sensor-0");
        let mut inbox = bus.register(&requester);
        // A registered bidder that never answers.
        let silent = AgentId::from("irrigation-mute");
        let _silent_inbox = bus.register(&silent);

        let mut cfp = water_cfp(&requester);
        let result = run_round(
            &bus,
            &mut inbox,
            &mut cfp,
            &[silent],
            Duration::from_millis(50),
        )
        .await;
        assert_eq!(result, Err(ProtocolError::NoProposals { cfp_id: cfp.id }));
        assert_eq!(cfp.status, CfpStatus::Failed);
    }

    #[tokio::test]
    async fn losers_are_rejected_and_winner_accepted() {
        let bus = MessageBus::new();
        let requester = AgentId::from("soil-sensor-0");
        let mut requester_inbox = bus.register(&requester);

        let fast = AgentId::from("irrigation-fast");
        let slow = AgentId::from("irrigation-slow");
        let mut fast_inbox = bus.register(&fast);
        let mut slow_inbox = bus.register(&slow);

        let mut cfp = water_cfp(&requester);
        let cfp_id = cfp.id;
        // Answer the broadcast by hand so both inboxes stay observable.
        let bus_clone = bus.clone();
        let driver = tokio::spawn(async move {
            for (inbox, id, eta) in [(&mut fast_inbox, &fast, 2), (&mut slow_inbox, &slow, 9)] {
                let Some(_call) = inbox.recv().await else { return None };
                let reply = Message::ProposeTask {
                    cfp_id,
                    eta_ticks: eta,
                    battery_lost: 0.5,
                    resource_cost: 20,
                };
                bus_clone.send(id, &AgentId::from("soil-sensor-0"), reply).ok()?;
            }
            let fast_decision = fast_inbox.recv().await.map(|e| e.message);
            let slow_decision = slow_inbox.recv().await.map(|e| e.message);
            Some((fast_decision, slow_decision))
        });

        let bidders = vec![AgentId::from("irrigation-fast"), AgentId::from("irrigation-slow")];
        let winner = run_round(
            &bus,
            &mut requester_inbox,
            &mut cfp,
            &bidders,
            Duration::from_secs(3),
        )
        .await
        .map(|p| p.bidder);
        assert_eq!(winner, Ok(AgentId::from("irrigation-fast")));

        let decisions = driver.await.ok().flatten();
        let (fast_decision, slow_decision) = decisions.unwrap_or((None, None));
        assert!(matches!(fast_decision, Some(Message::AcceptProposal { .. })));
        assert!(matches!(slow_decision, Some(Message::RejectProposal { .. })));
    }

    #[tokio::test]
    async fn completion_report_closes_the_round() {
        let bus = MessageBus::new();
        let requester = AgentId::from("soil-sensor-0");
        let mut inbox = bus.register(&requester);
        let winner = spawn_bidder(&bus, "irrigation-0", 3);

        let mut cfp = water_cfp(&requester);
        let awarded = run_round(
            &bus,
            &mut inbox,
            &mut cfp,
            std::slice::from_ref(&winner),
            Duration::from_secs(3),
        )
        .await;
        assert!(awarded.is_ok());

        let report = Message::Done {
            cfp_id: cfp.id,
            status: TaskStatus::Done,
            seed_type: None,
            details: TaskReport { resource_used: Some(20), ..TaskReport::default() },
        };
        bus.send(&winner, &requester, report).unwrap_or(());

        let completion = await_completion(&mut inbox, &mut cfp, Duration::from_secs(1)).await;
        assert!(matches!(completion, Ok(Completion::Done { .. })));
        assert_eq!(cfp.status, CfpStatus::Done);
    }

    #[tokio::test]
    async fn silent_winner_expires_the_round() {
        let bus = MessageBus::new();
        let requester = AgentId::from("soil-sensor-0");
        let mut inbox = bus.register(&requester);
        let winner = spawn_bidder(&bus, "irrigation-0", 3);

        let mut cfp = water_cfp(&requester);
        run_round(
            &bus,
            &mut inbox,
            &mut cfp,
            std::slice::from_ref(&winner),
            Duration::from_secs(3),
        )
        .await
        .map(|_| ())
        .unwrap_or(());

        let result = await_completion(&mut inbox, &mut cfp, Duration::from_millis(50)).await;
        assert_eq!(result, Err(ProtocolError::ExecutionTimeout { cfp_id: cfp.id }));
        assert_eq!(cfp.status, CfpStatus::Expired);
    }
}
