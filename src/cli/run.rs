//! Run command implementation
//!
//! Paper driver: one bar per tick, feeds a deterministic price path into the
//! paper exchange, places alternating long/short limit entries and polls the
//! lifecycle manager. Everything still pending is cancelled on exit.

use crate::config::{Config, NotifierConfig, NotifierMode, RunConfig};
use crate::exchange::PaperExchange;
use crate::notify::{ChannelNotifier, LogNotifier, NoopNotifier, Notifier};
use crate::orders::{Direction, OrderLifecycleManager, OrderParams, SignalData};
use clap::Args;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of bars to simulate (overrides config)
    #[arg(long)]
    pub bars: Option<u64>,

    /// Symbol to trade (overrides config)
    #[arg(long)]
    pub symbol: Option<String>,

    /// Bar length in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

impl RunArgs {
    fn resolve(&self, config: &RunConfig) -> RunConfig {
        let mut run = config.clone();
        if let Some(bars) = self.bars {
            run.bars = bars;
        }
        if let Some(symbol) = &self.symbol {
            run.symbol = symbol.clone();
        }
        if let Some(interval_ms) = self.interval_ms {
            run.bar_interval_ms = interval_ms;
        }
        run
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let run = self.resolve(&config.run);
        let contract = config.paper.contract_info();
        let path = PricePath::new(
            config.paper.initial_price,
            config.paper.swing_pct,
            contract.price_precision,
        );

        let exchange = Arc::new(PaperExchange::new());
        let notifier = build_notifier(&config.notifier);
        let mut manager =
            OrderLifecycleManager::new(exchange.clone(), notifier, config.orders.clone());

        if !manager.is_exchange_connected().await {
            anyhow::bail!("Paper exchange is not reachable");
        }

        tracing::info!(
            symbol = %run.symbol,
            strategy = %run.strategy,
            bars = run.bars,
            bar_interval_ms = run.bar_interval_ms,
            "Starting paper run"
        );

        let mut interval = tokio::time::interval(Duration::from_millis(run.bar_interval_ms.max(1)));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut placements = 0u64;
        for bar in 0..run.bars {
            tokio::select! {
                _ = interval.tick() => {}
                _ = &mut shutdown => {
                    tracing::info!(bar, "Shutdown requested");
                    break;
                }
            }

            let price = path.price_at(bar);
            exchange.update_price(&run.symbol, price).await;

            for signal in manager.check_pending_orders(bar).await {
                tracing::info!(
                    order_id = %signal.entry_order_id,
                    direction = %signal.direction,
                    entry_price = %signal.entry_price,
                    stop_loss = %signal.stop_loss,
                    take_profit = %signal.take_profit,
                    "Fill signal ready for protective orders"
                );
            }

            if bar % run.place_every_bars.max(1) == 0 {
                let params = entry_params(&run, placements, bar, price);
                manager
                    .create_pending_order(params, bar, run.max_wait_bars, &contract)
                    .await;
                placements += 1;
            }
        }

        let cancelled = manager.cancel_all_pending_orders().await;
        let stats = manager.stats();
        tracing::info!(
            placed = stats.placed,
            filled = stats.filled,
            timed_out = stats.timed_out,
            closed_by_exchange = stats.closed_by_exchange,
            cancelled_at_shutdown = cancelled,
            poll_errors = stats.poll_errors,
            "Paper run finished"
        );

        Ok(())
    }
}

fn build_notifier(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config.mode {
        NotifierMode::None => Arc::new(NoopNotifier),
        NotifierMode::Log => Arc::new(LogNotifier),
        NotifierMode::Channel => {
            let (notifier, mut rx) = ChannelNotifier::new(config.channel_buffer);
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match serde_json::to_string(&event) {
                        Ok(json) => println!("{}", json),
                        Err(e) => tracing::warn!(error = %e, "Failed to encode notification"),
                    }
                }
            });
            Arc::new(notifier)
        }
    }
}

/// Entry for the `index`-th placement: longs below the price, shorts above
fn entry_params(run: &RunConfig, index: u64, bar: u64, price: Decimal) -> OrderParams {
    let direction = if index % 2 == 0 {
        Direction::Long
    } else {
        Direction::Short
    };
    let one = Decimal::ONE;
    let (limit_price, stop_loss, take_profit) = match direction {
        Direction::Long => {
            let limit = price * (one - run.entry_offset_pct);
            (
                limit,
                limit * (one - run.stop_loss_pct),
                limit * (one + run.take_profit_pct),
            )
        }
        Direction::Short => {
            let limit = price * (one + run.entry_offset_pct);
            (
                limit,
                limit * (one + run.stop_loss_pct),
                limit * (one - run.take_profit_pct),
            )
        }
    };

    OrderParams {
        symbol: run.symbol.clone(),
        strategy: run.strategy.clone(),
        direction,
        limit_price,
        quantity: run.order_quantity,
        stop_loss,
        take_profit,
        signal_data: SignalData::with_pattern(run.strategy.clone())
            .confidence(Decimal::new(6, 1))
            .attr("signal_bar", bar),
    }
}

/// Deterministic oscillating price series
#[derive(Debug, Clone)]
pub struct PricePath {
    base: Decimal,
    swing: f64,
    precision: u32,
}

impl PricePath {
    /// Path around `base`, swinging by roughly `swing_pct` of it
    pub fn new(base: Decimal, swing_pct: Decimal, precision: u32) -> Self {
        Self {
            base,
            swing: swing_pct.to_f64().unwrap_or(0.0),
            precision,
        }
    }

    /// Price at the given bar
    pub fn price_at(&self, bar: u64) -> Decimal {
        let t = bar as f64;
        let phase = (t * 0.45).sin() + 0.5 * (t * 0.13).sin();
        let factor = Decimal::from_f64(1.0 + self.swing * phase).unwrap_or(Decimal::ONE);
        (self.base * factor).round_dp(self.precision)
    }
}
