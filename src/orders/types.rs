//! Order lifecycle types

use crate::exchange::{OrderReport, OrderSide, PositionSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Exchange side used to open a position in this direction
    pub fn order_side(self) -> OrderSide {
        match self {
            Self::Long => OrderSide::Buy,
            Self::Short => OrderSide::Sell,
        }
    }

    /// Hedge-mode position side
    pub fn position_side(self) -> PositionSide {
        match self {
            Self::Long => PositionSide::Long,
            Self::Short => PositionSide::Short,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "LONG"),
            Self::Short => write!(f, "SHORT"),
        }
    }
}

/// Strategy context carried from the entry signal through to the fill
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalData {
    /// Pattern that triggered the entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Strategy confidence score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Decimal>,
    /// Strategy-specific attributes
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SignalData {
    /// Signal data with a pattern name
    pub fn with_pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Default::default()
        }
    }

    /// Set the confidence score
    pub fn confidence(mut self, confidence: Decimal) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Attach a strategy-specific attribute
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// What the caller wants placed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderParams {
    pub symbol: String,
    pub strategy: String,
    pub direction: Direction,
    pub limit_price: Decimal,
    pub quantity: Decimal,
    /// Planned stop loss, placed downstream once filled
    pub stop_loss: Decimal,
    /// Planned take profit, placed downstream once filled
    pub take_profit: Decimal,
    #[serde(default)]
    pub signal_data: SignalData,
}

/// A placed limit order awaiting confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Exchange-assigned order id
    pub order_id: String,
    /// Idempotency tag sent with the placement
    pub client_order_id: Uuid,
    pub symbol: String,
    pub strategy: String,
    pub direction: Direction,
    /// Limit price after precision rounding
    pub limit_price: Decimal,
    pub quantity: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub signal_data: SignalData,
    /// Bar at which the order was placed
    pub created_bar: u64,
    /// Bars to wait before cancelling
    pub max_wait_bars: u64,
    /// Bars elapsed as of the last poll
    pub bars_waited: u64,
    /// Wall-clock placement time (informational)
    pub created_at: DateTime<Utc>,
}

impl PendingOrder {
    /// Recompute bars waited for the given bar; never moves backwards
    pub fn update_bars_waited(&mut self, current_bar: u64) -> u64 {
        let elapsed = current_bar.saturating_sub(self.created_bar);
        if elapsed > self.bars_waited {
            self.bars_waited = elapsed;
        }
        self.bars_waited
    }

    /// True once the order has waited its full allowance
    pub fn is_timed_out(&self) -> bool {
        self.bars_waited >= self.max_wait_bars
    }

    /// Build the fill signal for a FILLED report
    ///
    /// A missing or zero average price / executed quantity falls back to the
    /// planned limit price / quantity.
    pub fn to_fill_signal(&self, report: &OrderReport, filled_at: DateTime<Utc>) -> FillSignal {
        let entry_price = report
            .avg_price
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(self.limit_price);
        let quantity = report
            .executed_qty
            .filter(|q| *q > Decimal::ZERO)
            .unwrap_or(self.quantity);

        FillSignal {
            strategy: self.strategy.clone(),
            direction: self.direction,
            entry_price,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            symbol: self.symbol.clone(),
            quantity,
            entry_order_id: self.order_id.clone(),
            pattern: self.signal_data.pattern.clone(),
            confidence: self.signal_data.confidence,
            extra: self.signal_data.extra.clone(),
            bars_waited: self.bars_waited,
            filled_at,
        }
    }
}

/// Confirmed entry, ready for stop-loss / take-profit placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSignal {
    pub strategy: String,
    pub direction: Direction,
    /// Average execution price
    pub entry_price: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub symbol: String,
    /// Executed quantity
    pub quantity: Decimal,
    pub entry_order_id: String,
    pub pattern: Option<String>,
    pub confidence: Option<Decimal>,
    /// Strategy-specific attributes passed through from the entry
    pub extra: BTreeMap<String, serde_json::Value>,
    pub bars_waited: u64,
    pub filled_at: DateTime<Utc>,
}

/// How a tracked order left the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Confirmed filled and converted to a signal
    Filled,
    /// Cancelled, rejected or expired by the exchange
    ClosedByExchange,
    /// Waited too many bars; cancel attempted locally
    TimedOut,
    /// Cancelled by the caller or at shutdown
    Cancelled,
}

/// Running lifecycle counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStats {
    pub placed: u64,
    pub placement_failures: u64,
    pub filled: u64,
    pub closed_by_exchange: u64,
    pub timed_out: u64,
    pub cancelled: u64,
    pub poll_errors: u64,
}

impl LifecycleStats {
    /// Count an order leaving the store
    pub fn record_resolution(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Filled => self.filled += 1,
            Resolution::ClosedByExchange => self.closed_by_exchange += 1,
            Resolution::TimedOut => self.timed_out += 1,
            Resolution::Cancelled => self.cancelled += 1,
        }
    }

    /// Orders that reached any terminal state
    pub fn resolved(&self) -> u64 {
        self.filled + self.closed_by_exchange + self.timed_out + self.cancelled
    }
}
