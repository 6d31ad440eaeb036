//! Fill and cancel notifications
//!
//! Notifications are fire-and-forget: implementations must not block the
//! caller and must never fail it. The manager receives its notifier through
//! its constructor.

mod channel;

pub use channel::{ChannelNotifier, NotifyEvent};

use crate::orders::Direction;
use rust_decimal::Decimal;

/// Trait for notification sinks
pub trait Notifier: Send + Sync {
    /// A tracked limit order was confirmed filled
    fn notify_limit_order_filled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        fill_price: Decimal,
        quantity: Decimal,
        bars_waited: u64,
    );

    /// A tracked limit order was cancelled locally (timeout or caller request)
    fn notify_limit_order_cancelled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        limit_price: Decimal,
        reason: &str,
    );
}

/// Notifier that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify_limit_order_filled(
        &self,
        _strategy: &str,
        _symbol: &str,
        _direction: Direction,
        _fill_price: Decimal,
        _quantity: Decimal,
        _bars_waited: u64,
    ) {
    }

    fn notify_limit_order_cancelled(
        &self,
        _strategy: &str,
        _symbol: &str,
        _direction: Direction,
        _limit_price: Decimal,
        _reason: &str,
    ) {
    }
}

/// Notifier that writes events to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_limit_order_filled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        fill_price: Decimal,
        quantity: Decimal,
        bars_waited: u64,
    ) {
        tracing::info!(
            target: "notify",
            strategy,
            symbol,
            %direction,
            %fill_price,
            %quantity,
            bars_waited,
            "Limit order filled"
        );
    }

    fn notify_limit_order_cancelled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        limit_price: Decimal,
        reason: &str,
    ) {
        tracing::info!(
            target: "notify",
            strategy,
            symbol,
            %direction,
            %limit_price,
            reason,
            "Limit order cancelled"
        );
    }
}
