//! Channel-backed notifier

use super::Notifier;
use crate::orders::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A notification, as delivered over the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotifyEvent {
    Filled {
        strategy: String,
        symbol: String,
        direction: Direction,
        fill_price: Decimal,
        quantity: Decimal,
        bars_waited: u64,
    },
    Cancelled {
        strategy: String,
        symbol: String,
        direction: Direction,
        limit_price: Decimal,
        reason: String,
    },
}

/// Forwards notifications to an mpsc receiver
///
/// Uses `try_send`, so a full or closed channel drops the event instead of
/// stalling the poll cycle.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::Sender<NotifyEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<NotifyEvent>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { tx }, rx)
    }

    fn send(&self, event: NotifyEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "Dropping notification");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn notify_limit_order_filled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        fill_price: Decimal,
        quantity: Decimal,
        bars_waited: u64,
    ) {
        self.send(NotifyEvent::Filled {
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            direction,
            fill_price,
            quantity,
            bars_waited,
        });
    }

    fn notify_limit_order_cancelled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        limit_price: Decimal,
        reason: &str,
    ) {
        self.send(NotifyEvent::Cancelled {
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            direction,
            limit_price,
            reason: reason.to_string(),
        });
    }
}
