//! Warehouse task.
//!
//! The warehouse is a passive bookkeeper: it accepts harvest deliveries,
//! keeps a per-crop yield ledger, and acknowledges each delivery with an
//! `inform_received` receipt. Crop notices from the drone are logged only.

use std::collections::BTreeMap;

use agrimesh_protocol::MessageBus;
use agrimesh_types::{AgentId, CropKind, Message, YieldLot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Running yield totals per crop.
pub type YieldLedger = BTreeMap<CropKind, f64>;

/// Spawn the warehouse bookkeeper.
pub fn spawn(bus: MessageBus, id: AgentId) -> JoinHandle<()> {
    let mut inbox = bus.register(&id);
    tokio::spawn(async move {
        let mut ledger = YieldLedger::new();
        while let Some(envelope) = inbox.recv().await {
            match envelope.message {
                Message::InformHarvest { amount_type, checked_at } => {
                    book_lots(&mut ledger, &amount_type);
                    let total: f64 = ledger.values().sum();
                    info!(agent = %id, from = %envelope.from, lots = amount_type.len(),
                        stored_total = total, "harvest received");
                    let receipt = Message::InformReceived {
                        details: amount_type,
                        checked_at,
                    };
                    if bus.send(&id, &envelope.from, receipt).is_err() {
                        warn!(agent = %id, courier = %envelope.from, "receipt undeliverable");
                    }
                }
                Message::InformCrop { zone, crop_type, state, .. } => {
                    debug!(agent = %id, from = %envelope.from, zone = %zone,
                        crop = ?crop_type, state, "crop notice");
                }
                other => {
                    trace!(agent = %id, message = ?other, "unhandled message");
                }
            }
        }
    })
}

fn book_lots(ledger: &mut YieldLedger, lots: &[YieldLot]) {
    for lot in lots {
        let entry = ledger.entry(lot.seed_type).or_insert(0.0);
        *entry += lot.amount;
    }
}
