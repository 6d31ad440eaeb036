//! Exchange error categories

use thiserror::Error;

/// Binance-style error code for "unknown order sent". Returned when cancelling
/// an order that has already been filled or cancelled.
pub const CODE_UNKNOWN_ORDER: i64 = -2011;

/// Order does not exist (query side)
const CODE_ORDER_DOES_NOT_EXIST: i64 = -2013;

/// Errors returned by an [`ExchangeClient`](super::ExchangeClient)
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// Network failure, timeout, rate limit or 5xx; worth retrying later
    #[error("Transient exchange error: {0}")]
    Transient(String),
    /// Request reached the exchange and was refused
    #[error("Exchange rejected request ({code}): {message}")]
    Rejected { code: i64, message: String },
    /// Order id unknown to the exchange
    #[error("Order not found: {0}")]
    NotFound(String),
    /// Anything the client could not classify
    #[error("Unexpected exchange error: {0}")]
    Unknown(String),
}

impl ExchangeError {
    /// Convenience constructor for a rejection
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    /// True if the same request may succeed on a later attempt
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// True if the error means the order is no longer open on the exchange
    /// (already filled, already cancelled, or never known).
    pub fn is_already_resolved(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Rejected { code, .. } => {
                *code == CODE_UNKNOWN_ORDER || *code == CODE_ORDER_DOES_NOT_EXIST
            }
            _ => false,
        }
    }
}
