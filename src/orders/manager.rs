//! Order lifecycle manager
//!
//! Places limit orders, polls them once per bar, converts fills into
//! [`FillSignal`]s and cancels orders that waited too long. The manager is the
//! single writer of its [`PendingOrderStore`]: every mutating method takes
//! `&mut self`, and an order is removed from the store in the same step that
//! resolves it, so a fill is converted at most once.
//!
//! Nothing on the public surface returns an error for a single order's
//! failure. Placement failures come back as `None` (or a [`PlacementError`]
//! from [`OrderLifecycleManager::try_create_pending_order`]); poll and cancel
//! failures are logged and the cycle carries on.

use super::{
    FillSignal, LifecycleStats, OrderParams, PendingOrder, PendingOrderStore, PlacementError,
    Resolution,
};
use crate::exchange::{
    ContractInfo, ExchangeClient, ExchangeError, OrderReport, OrderRequest, OrderStatus,
    OrderType, TimeInForce,
};
use crate::notify::{NoopNotifier, Notifier};
use crate::telemetry::{self, CounterMetric, GaugeMetric, LatencyMetric};
use chrono::Utc;
use futures_util::{future, stream, FutureExt, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Bars an order may wait when the caller does not say otherwise
pub const DEFAULT_MAX_WAIT_BARS: u64 = 3;

/// Manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Timeout used when a placement does not pass `max_wait_bars`
    #[serde(default = "default_max_wait_bars")]
    pub default_max_wait_bars: u64,
    /// Status queries in flight per poll cycle (1 = sequential)
    #[serde(default = "default_poll_concurrency")]
    pub poll_concurrency: usize,
    /// Cancel requests in flight during bulk cancellation
    #[serde(default = "default_cancel_concurrency")]
    pub cancel_concurrency: usize,
}

fn default_max_wait_bars() -> u64 {
    DEFAULT_MAX_WAIT_BARS
}
fn default_poll_concurrency() -> usize {
    1
}
fn default_cancel_concurrency() -> usize {
    4
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            default_max_wait_bars: DEFAULT_MAX_WAIT_BARS,
            poll_concurrency: 1,
            cancel_concurrency: 4,
        }
    }
}

type Caught<T> = Result<T, Box<dyn Any + Send>>;

/// Tracks placed limit orders until they fill, close or time out
pub struct OrderLifecycleManager {
    exchange: Arc<dyn ExchangeClient>,
    notifier: Arc<dyn Notifier>,
    config: ManagerConfig,
    store: PendingOrderStore,
    stats: LifecycleStats,
}

impl OrderLifecycleManager {
    /// Create a manager over the given exchange and notifier
    pub fn new(
        exchange: Arc<dyn ExchangeClient>,
        notifier: Arc<dyn Notifier>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            exchange,
            notifier,
            config,
            store: PendingOrderStore::new(),
            stats: LifecycleStats::default(),
        }
    }

    /// Create a manager with default configuration and no notifications
    pub fn with_exchange(exchange: Arc<dyn ExchangeClient>) -> Self {
        Self::new(exchange, Arc::new(NoopNotifier), ManagerConfig::default())
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Place a limit order and start tracking it
    ///
    /// Returns `None` if nothing was tracked; the reason is logged.
    pub async fn create_pending_order(
        &mut self,
        params: OrderParams,
        current_bar: u64,
        max_wait_bars: Option<u64>,
        contract: &ContractInfo,
    ) -> Option<PendingOrder> {
        self.try_create_pending_order(params, current_bar, max_wait_bars, contract)
            .await
            .ok()
    }

    /// Place a limit order and start tracking it, reporting why on failure
    ///
    /// The limit price is rounded to the contract precision before
    /// submission. On any error the store is left unchanged. No retry is
    /// attempted.
    pub async fn try_create_pending_order(
        &mut self,
        params: OrderParams,
        current_bar: u64,
        max_wait_bars: Option<u64>,
        contract: &ContractInfo,
    ) -> Result<PendingOrder, PlacementError> {
        let result = self
            .place(&params, current_bar, max_wait_bars, contract)
            .await;

        match &result {
            Ok(order) => {
                self.stats.placed += 1;
                telemetry::increment(CounterMetric::OrdersPlaced);
                self.update_pending_gauge();
                tracing::info!(
                    order_id = %order.order_id,
                    symbol = %order.symbol,
                    strategy = %order.strategy,
                    direction = %order.direction,
                    limit_price = %order.limit_price,
                    quantity = %order.quantity,
                    created_bar = order.created_bar,
                    max_wait_bars = order.max_wait_bars,
                    "Limit order placed"
                );
            }
            Err(e) => {
                self.stats.placement_failures += 1;
                telemetry::increment(CounterMetric::PlacementFailures);
                tracing::error!(
                    symbol = %params.symbol,
                    strategy = %params.strategy,
                    direction = %params.direction,
                    limit_price = %params.limit_price,
                    quantity = %params.quantity,
                    current_bar,
                    error = %e,
                    "Limit order placement failed"
                );
            }
        }

        result
    }

    async fn place(
        &mut self,
        params: &OrderParams,
        current_bar: u64,
        max_wait_bars: Option<u64>,
        contract: &ContractInfo,
    ) -> Result<PendingOrder, PlacementError> {
        let quantity = contract.round_quantity(params.quantity);
        if quantity <= Decimal::ZERO {
            return Err(PlacementError::InvalidOrder(format!(
                "quantity must be positive at {} decimals, got {}",
                contract.quantity_precision, params.quantity
            )));
        }
        let limit_price = contract.round_price(params.limit_price);
        if limit_price <= Decimal::ZERO {
            return Err(PlacementError::InvalidOrder(format!(
                "limit price must be positive, got {}",
                params.limit_price
            )));
        }

        let request = OrderRequest {
            symbol: params.symbol.clone(),
            side: params.direction.order_side(),
            position_side: params.direction.position_side(),
            order_type: OrderType::Limit,
            price: limit_price,
            quantity,
            time_in_force: TimeInForce::Gtc,
            client_order_id: Uuid::new_v4(),
        };

        let started = Instant::now();
        let response = AssertUnwindSafe(self.exchange.place_order(&request))
            .catch_unwind()
            .await
            .map_err(|panic| PlacementError::Unexpected(panic_message(&*panic)))??;
        telemetry::record_latency(LatencyMetric::OrderPlacement, started.elapsed());

        let order_id = match response.order_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                tracing::error!(
                    client_order_id = %request.client_order_id,
                    response = ?response,
                    "Exchange acknowledged placement without an order id"
                );
                return Err(PlacementError::MissingOrderId);
            }
        };

        let order = PendingOrder {
            order_id,
            client_order_id: request.client_order_id,
            symbol: params.symbol.clone(),
            strategy: params.strategy.clone(),
            direction: params.direction,
            limit_price,
            quantity,
            stop_loss: params.stop_loss,
            take_profit: params.take_profit,
            signal_data: params.signal_data.clone(),
            created_bar: current_bar,
            max_wait_bars: max_wait_bars.unwrap_or(self.config.default_max_wait_bars),
            bars_waited: 0,
            created_at: Utc::now(),
        };

        if let Err(existing) = self.store.insert(order.clone()) {
            // the second order is live but untracked; take it off the book
            cancel_on_exchange(self.exchange.as_ref(), &order.symbol, &order.order_id).await;
            return Err(PlacementError::DuplicateOrderId(existing.order_id));
        }

        Ok(order)
    }

    /// Run one poll/reconcile cycle for `current_bar`
    ///
    /// Every tracked order is visited once: orders past their wait allowance
    /// are cancelled and dropped without a status query; the rest are queried
    /// and dropped on a terminal status. Returns the fills confirmed this
    /// cycle, in no particular order.
    pub async fn check_pending_orders(&mut self, current_bar: u64) -> Vec<FillSignal> {
        if self.store.is_empty() {
            return Vec::new();
        }
        let started = Instant::now();

        let mut timed_out = Vec::new();
        let mut to_query = Vec::new();
        for order in self.store.iter_mut() {
            order.update_bars_waited(current_bar);
            if order.is_timed_out() {
                timed_out.push(order.clone());
            } else {
                to_query.push((order.symbol.clone(), order.order_id.clone()));
            }
        }

        for order in timed_out {
            self.time_out(order).await;
        }

        let exchange = self.exchange.as_ref();
        let reports: Vec<(String, Caught<Result<OrderReport, ExchangeError>>)> =
            stream::iter(to_query)
                .map(|(symbol, order_id)| async move {
                    let outcome = AssertUnwindSafe(exchange.get_order(&symbol, &order_id))
                        .catch_unwind()
                        .await;
                    (order_id, outcome)
                })
                .buffer_unordered(self.config.poll_concurrency.max(1))
                .collect()
                .await;

        let mut signals = Vec::new();
        for (order_id, outcome) in reports {
            match outcome {
                Ok(Ok(report)) => {
                    if let Some(signal) = self.apply_report(&order_id, report) {
                        signals.push(signal);
                    }
                }
                Ok(Err(e)) => self.record_poll_error(&order_id, &e.to_string(), e.is_transient()),
                Err(panic) => self.record_poll_error(&order_id, &panic_message(&*panic), false),
            }
        }

        self.update_pending_gauge();
        telemetry::record_latency(LatencyMetric::PollCycle, started.elapsed());
        tracing::debug!(
            current_bar,
            fills = signals.len(),
            pending = self.store.len(),
            "Poll cycle complete"
        );

        signals
    }

    /// Drop an order that waited too long; the local decision is final
    async fn time_out(&mut self, order: PendingOrder) {
        let reason = format!("Timeout after {} bars", order.bars_waited);
        guard_notifier(&order.order_id, || {
            self.notifier.notify_limit_order_cancelled(
                &order.strategy,
                &order.symbol,
                order.direction,
                order.limit_price,
                &reason,
            )
        });

        let cancelled =
            cancel_on_exchange(self.exchange.as_ref(), &order.symbol, &order.order_id).await;
        self.store.remove(&order.order_id);
        self.record_resolution(Resolution::TimedOut);

        tracing::info!(
            order_id = %order.order_id,
            symbol = %order.symbol,
            strategy = %order.strategy,
            bars_waited = order.bars_waited,
            max_wait_bars = order.max_wait_bars,
            cancelled,
            "Limit order timed out"
        );
    }

    fn apply_report(&mut self, order_id: &str, report: OrderReport) -> Option<FillSignal> {
        match report.status {
            OrderStatus::Filled => {
                let order = self.store.remove(order_id)?;
                let signal = order.to_fill_signal(&report, Utc::now());
                guard_notifier(order_id, || {
                    self.notifier.notify_limit_order_filled(
                        &order.strategy,
                        &order.symbol,
                        order.direction,
                        signal.entry_price,
                        signal.quantity,
                        order.bars_waited,
                    )
                });
                self.record_resolution(Resolution::Filled);

                tracing::info!(
                    order_id,
                    symbol = %order.symbol,
                    strategy = %order.strategy,
                    direction = %order.direction,
                    entry_price = %signal.entry_price,
                    quantity = %signal.quantity,
                    bars_waited = order.bars_waited,
                    "Limit order filled"
                );
                Some(signal)
            }
            ref status if status.is_closed_without_fill() => {
                let order = self.store.remove(order_id)?;
                self.record_resolution(Resolution::ClosedByExchange);

                tracing::info!(
                    order_id,
                    symbol = %order.symbol,
                    strategy = %order.strategy,
                    %status,
                    "Limit order closed by exchange"
                );
                None
            }
            ref status => {
                tracing::debug!(order_id, %status, "Limit order still open");
                None
            }
        }
    }

    fn record_poll_error(&mut self, order_id: &str, error: &str, transient: bool) {
        self.stats.poll_errors += 1;
        telemetry::increment(CounterMetric::PollErrors);

        let symbol = self.store.get(order_id).map(|o| o.symbol.as_str()).unwrap_or("");
        if transient {
            tracing::warn!(order_id, symbol, error, "Order status check failed, retrying next bar");
        } else {
            tracing::error!(order_id, symbol, error, "Order status check failed, order kept");
        }
    }

    /// Best-effort cancel of an order on the exchange
    ///
    /// Does not touch the store. An "already filled or cancelled" response is
    /// logged as benign; every failure yields `false`.
    pub async fn cancel_order(&self, symbol: &str, order_id: &str) -> bool {
        cancel_on_exchange(self.exchange.as_ref(), symbol, order_id).await
    }

    /// Cancel one tracked order and stop tracking it
    ///
    /// The order is dropped whatever the exchange answers. Returns whether the
    /// cancel call itself succeeded, or `false` if the order is not tracked.
    pub async fn cancel_pending_order(&mut self, order_id: &str) -> bool {
        let Some(order) = self.store.get(order_id).cloned() else {
            tracing::warn!(order_id, "Cancel requested for untracked order");
            return false;
        };

        guard_notifier(order_id, || {
            self.notifier.notify_limit_order_cancelled(
                &order.strategy,
                &order.symbol,
                order.direction,
                order.limit_price,
                "Cancelled by caller",
            )
        });
        let cancelled =
            cancel_on_exchange(self.exchange.as_ref(), &order.symbol, &order.order_id).await;
        self.store.remove(order_id);
        self.record_resolution(Resolution::Cancelled);
        self.update_pending_gauge();

        cancelled
    }

    /// Cancel every tracked order and empty the store
    ///
    /// Intended as a shutdown hook. The store is emptied even if every cancel
    /// fails. Returns the number of cancel calls that succeeded.
    pub async fn cancel_all_pending_orders(&mut self) -> usize {
        if self.store.is_empty() {
            return 0;
        }

        let orders = self.store.snapshot();
        let exchange = self.exchange.as_ref();
        let cancelled = stream::iter(orders.iter())
            .map(|order| cancel_on_exchange(exchange, &order.symbol, &order.order_id))
            .buffer_unordered(self.config.cancel_concurrency.max(1))
            .filter(|ok| future::ready(*ok))
            .count()
            .await;

        let dropped = self.store.clear();
        self.stats.cancelled += dropped as u64;
        telemetry::increment_by(CounterMetric::OrdersCancelled, dropped as u64);
        self.update_pending_gauge();

        tracing::warn!(
            total = dropped,
            cancelled,
            failed = dropped - cancelled,
            "Cancelled all pending orders"
        );
        cancelled
    }

    /// Number of tracked orders
    pub fn get_pending_count(&self) -> usize {
        self.store.len()
    }

    /// Tracked orders placed by `strategy`
    pub fn get_pending_orders_for_strategy(&self, strategy: &str) -> Vec<PendingOrder> {
        self.store.by_strategy(strategy).cloned().collect()
    }

    /// Look up a tracked order
    pub fn get_pending_order(&self, order_id: &str) -> Option<&PendingOrder> {
        self.store.get(order_id)
    }

    pub fn stats(&self) -> &LifecycleStats {
        &self.stats
    }

    /// Check exchange connectivity
    pub async fn is_exchange_connected(&self) -> bool {
        match self.exchange.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Exchange connectivity check failed");
                false
            }
        }
    }

    fn record_resolution(&mut self, resolution: Resolution) {
        self.stats.record_resolution(resolution);
        let metric = match resolution {
            Resolution::Filled => CounterMetric::OrdersFilled,
            Resolution::ClosedByExchange => CounterMetric::OrdersClosedByExchange,
            Resolution::TimedOut => CounterMetric::OrdersTimedOut,
            Resolution::Cancelled => CounterMetric::OrdersCancelled,
        };
        telemetry::increment(metric);
    }

    fn update_pending_gauge(&self) {
        telemetry::set_gauge(GaugeMetric::PendingOrders, self.store.len() as f64);
    }
}

async fn cancel_on_exchange(exchange: &dyn ExchangeClient, symbol: &str, order_id: &str) -> bool {
    match AssertUnwindSafe(exchange.cancel_order(symbol, order_id))
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {
            tracing::info!(order_id, symbol, "Order cancelled");
            true
        }
        Ok(Err(e)) if e.is_already_resolved() => {
            tracing::info!(order_id, symbol, error = %e, "Order already filled or cancelled");
            false
        }
        Ok(Err(e)) => {
            tracing::warn!(order_id, symbol, error = %e, "Order cancel failed");
            false
        }
        Err(panic) => {
            tracing::error!(
                order_id,
                symbol,
                error = %panic_message(&*panic),
                "Unexpected failure cancelling order"
            );
            false
        }
    }
}

/// Run a notifier callback, logging a panic instead of propagating it
fn guard_notifier(order_id: &str, notify: impl FnOnce()) {
    if let Err(panic) = std::panic::catch_unwind(AssertUnwindSafe(notify)) {
        tracing::error!(
            order_id,
            error = %panic_message(&*panic),
            "Notifier failed, order resolution unaffected"
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
