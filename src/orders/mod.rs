//! Limit order lifecycle
//!
//! Placement, per-bar polling, timeout and cancellation of exchange limit
//! orders.
//!
//! ```text
//!                 ┌──────────┐
//!     place ─────►│  Placed  │◄──── NEW / PARTIALLY_FILLED / query error
//!                 └────┬─────┘
//!        ┌─────────────┼──────────────┬──────────────────┐
//!        ▼             ▼              ▼                  ▼
//!   ┌────────┐  ┌──────────────┐ ┌──────────┐     ┌───────────┐
//!   │ Filled │  │ClosedByExch. │ │ TimedOut │     │ Cancelled │
//!   └────────┘  └──────────────┘ └──────────┘     └───────────┘
//!   FillSignal  CANCELED/REJECTED  bars_waited ≥    caller or
//!               /EXPIRED           max_wait_bars    shutdown
//! ```
//!
//! Every terminal state removes the order from the store.

mod error;
mod manager;
mod store;
mod types;

pub use error::PlacementError;
pub use manager::{ManagerConfig, OrderLifecycleManager, DEFAULT_MAX_WAIT_BARS};
pub use store::PendingOrderStore;
pub use types::{
    Direction, FillSignal, LifecycleStats, OrderParams, PendingOrder, Resolution, SignalData,
};
