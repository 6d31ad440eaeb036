//! Order lifecycle errors

use crate::exchange::ExchangeError;
use thiserror::Error;

/// Why a placement produced no tracked order
#[derive(Debug, Error)]
pub enum PlacementError {
    /// Parameters failed local validation; nothing was sent
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
    /// Exchange refused or failed the request
    #[error("Placement failed: {0}")]
    Exchange(#[from] ExchangeError),
    /// Exchange acknowledged without an order id
    #[error("Placement response carried no order id")]
    MissingOrderId,
    /// Exchange returned an id that is already tracked
    #[error("Order id {0} is already tracked")]
    DuplicateOrderId(String),
    /// Exchange client panicked
    #[error("Unexpected placement failure: {0}")]
    Unexpected(String),
}
