//! limit-order-lifecycle: bar-clocked limit order lifecycle management
//!
//! This library provides:
//! - Limit order placement with contract precision rounding
//! - Per-bar polling that turns confirmed fills into typed fill signals
//! - Bar-count timeouts with best-effort exchange cancellation
//! - Bulk cancellation for shutdown
//! - An exchange client boundary with a paper venue for simulation
//! - Injectable fill/cancel notifications
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod exchange;
pub mod notify;
pub mod orders;
pub mod telemetry;
