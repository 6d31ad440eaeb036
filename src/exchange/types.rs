//! Exchange request/response types

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Order side as the exchange sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Hedge-mode position side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    Limit,
}

/// Time in force
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good till cancelled
    #[default]
    Gtc,
}

/// An order to be submitted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub position_side: PositionSide,
    pub order_type: OrderType,
    /// Limit price, already rounded to the contract precision
    pub price: Decimal,
    pub quantity: Decimal,
    pub time_in_force: TimeInForce,
    /// Client-side idempotency tag
    pub client_order_id: Uuid,
}

/// Placement acknowledgement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    /// Exchange-assigned order id; a well-formed response always carries one
    pub order_id: Option<String>,
    /// Status reported at placement time, if any
    pub status: Option<OrderStatus>,
}

impl PlaceOrderResponse {
    /// Acknowledgement carrying an order id
    pub fn accepted(order_id: impl Into<String>) -> Self {
        Self {
            order_id: Some(order_id.into()),
            status: Some(OrderStatus::New),
        }
    }
}

/// Order status as reported by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    /// Status string this crate does not recognise
    Unknown(String),
}

impl OrderStatus {
    /// Parse an exchange status string (e.g. `"PARTIALLY_FILLED"`)
    pub fn from_exchange_str(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "NEW" => Self::New,
            "PARTIALLY_FILLED" => Self::PartiallyFilled,
            "FILLED" => Self::Filled,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            _ => Self::Unknown(status.to_string()),
        }
    }

    /// Closed on the exchange without a fill
    pub fn is_closed_without_fill(&self) -> bool {
        matches!(self, Self::Canceled | Self::Rejected | Self::Expired)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "NEW"),
            Self::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Expired => write!(f, "EXPIRED"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Result of an order status query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReport {
    pub status: OrderStatus,
    /// Average execution price, absent until something executed
    pub avg_price: Option<Decimal>,
    /// Executed quantity
    pub executed_qty: Option<Decimal>,
}

impl OrderReport {
    /// Report with a bare status and no execution data
    pub fn with_status(status: OrderStatus) -> Self {
        Self {
            status,
            avg_price: None,
            executed_qty: None,
        }
    }

    /// Fully filled report
    pub fn filled(avg_price: Decimal, executed_qty: Decimal) -> Self {
        Self {
            status: OrderStatus::Filled,
            avg_price: Some(avg_price),
            executed_qty: Some(executed_qty),
        }
    }
}

/// Contract precision metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractInfo {
    /// Decimal places allowed in the price
    pub price_precision: u32,
    /// Decimal places allowed in the quantity
    pub quantity_precision: u32,
    /// Minimum price increment, if the venue publishes one
    #[serde(default)]
    pub tick_size: Option<Decimal>,
}

impl ContractInfo {
    /// Contract with the given precisions and no tick size
    pub fn new(price_precision: u32, quantity_precision: u32) -> Self {
        Self {
            price_precision,
            quantity_precision,
            tick_size: None,
        }
    }

    /// Round a price to the contract's precision
    ///
    /// Uses banker's rounding at `price_precision` places, then snaps down to
    /// the tick size when one is set.
    pub fn round_price(&self, price: Decimal) -> Decimal {
        let rounded = price.round_dp(self.price_precision);
        match self.tick_size {
            Some(tick) if tick > Decimal::ZERO => {
                ((rounded / tick).floor() * tick).round_dp(self.price_precision)
            }
            _ => rounded,
        }
    }

    /// Truncate a quantity to `quantity_precision` places
    ///
    /// Rounds toward zero so the submitted size never exceeds the plan.
    pub fn round_quantity(&self, quantity: Decimal) -> Decimal {
        quantity.round_dp_with_strategy(self.quantity_precision, RoundingStrategy::ToZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_status() {
        assert_eq!(OrderStatus::from_exchange_str("NEW"), OrderStatus::New);
        assert_eq!(
            OrderStatus::from_exchange_str("PARTIALLY_FILLED"),
            OrderStatus::PartiallyFilled
        );
        assert_eq!(OrderStatus::from_exchange_str("filled"), OrderStatus::Filled);
        assert_eq!(
            OrderStatus::from_exchange_str("CANCELLED"),
            OrderStatus::Canceled
        );
        assert_eq!(
            OrderStatus::from_exchange_str("EXPIRED_IN_MATCH"),
            OrderStatus::Unknown("EXPIRED_IN_MATCH".to_string())
        );
    }

    #[test]
    fn test_closed_without_fill() {
        assert!(OrderStatus::Canceled.is_closed_without_fill());
        assert!(OrderStatus::Rejected.is_closed_without_fill());
        assert!(OrderStatus::Expired.is_closed_without_fill());
        assert!(!OrderStatus::Filled.is_closed_without_fill());
        assert!(!OrderStatus::PartiallyFilled.is_closed_without_fill());
    }

    #[test]
    fn test_round_price_precision() {
        let contract = ContractInfo::new(2, 3);
        assert_eq!(contract.round_price(dec!(100.126)), dec!(100.13));
        assert_eq!(contract.round_price(dec!(100.124)), dec!(100.12));
        // banker's rounding on the midpoint
        assert_eq!(contract.round_price(dec!(100.125)), dec!(100.12));
    }

    #[test]
    fn test_round_price_tick_size() {
        let contract = ContractInfo {
            price_precision: 1,
            quantity_precision: 3,
            tick_size: Some(dec!(0.5)),
        };
        assert_eq!(contract.round_price(dec!(100.74)), dec!(100.5));
        assert_eq!(contract.round_price(dec!(101.0)), dec!(101.0));
    }

    #[test]
    fn test_round_quantity_truncates() {
        let contract = ContractInfo::new(2, 3);
        assert_eq!(contract.round_quantity(dec!(0.0129)), dec!(0.012));
        assert_eq!(contract.round_quantity(dec!(1.5)), dec!(1.5));
        assert_eq!(contract.round_quantity(dec!(0.0004)), dec!(0));
    }

    #[test]
    fn test_order_side_serialization() {
        assert_eq!(serde_json::to_string(&OrderSide::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&TimeInForce::Gtc).unwrap(),
            "\"GTC\""
        );
    }
}
