//! Exchange client boundary
//!
//! The live REST/WebSocket client lives outside this crate; the lifecycle
//! manager only talks to the [`ExchangeClient`] trait. [`PaperExchange`] is an
//! in-memory venue used by the `run` command and in tests.

mod error;
mod paper;
mod types;

pub use error::{ExchangeError, CODE_UNKNOWN_ORDER};
pub use paper::PaperExchange;
pub use types::{
    ContractInfo, OrderReport, OrderRequest, OrderSide, OrderStatus, OrderType,
    PlaceOrderResponse, PositionSide, TimeInForce,
};

use async_trait::async_trait;

/// Trait for exchange client implementations
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Submit an order
    async fn place_order(&self, request: &OrderRequest)
        -> Result<PlaceOrderResponse, ExchangeError>;
    /// Query the current state of an order
    async fn get_order(&self, symbol: &str, order_id: &str) -> Result<OrderReport, ExchangeError>;
    /// Cancel an open order
    async fn cancel_order(&self, symbol: &str, order_id: &str) -> Result<(), ExchangeError>;
    /// Check connectivity
    async fn ping(&self) -> Result<(), ExchangeError>;
}
