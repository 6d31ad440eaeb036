//! Configuration types for limit-order-lifecycle

use crate::exchange::ContractInfo;
use crate::orders::ManagerConfig;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub orders: ManagerConfig,
    #[serde(default)]
    pub paper: PaperConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    pub telemetry: TelemetryConfig,
}

/// Paper exchange configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Starting price of the simulated market
    #[serde(default = "default_initial_price")]
    pub initial_price: Decimal,
    /// Amplitude of the simulated price swing, as a fraction of the start price
    #[serde(default = "default_swing_pct")]
    pub swing_pct: Decimal,
    /// Decimal places allowed in prices
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,
    /// Decimal places allowed in quantities
    #[serde(default = "default_quantity_precision")]
    pub quantity_precision: u32,
    /// Minimum price increment
    #[serde(default)]
    pub tick_size: Option<Decimal>,
}

fn default_initial_price() -> Decimal {
    Decimal::new(50_000, 0)
}
fn default_swing_pct() -> Decimal {
    Decimal::new(1, 2) // 0.01 = 1%
}
fn default_price_precision() -> u32 {
    1
}
fn default_quantity_precision() -> u32 {
    3
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            initial_price: default_initial_price(),
            swing_pct: default_swing_pct(),
            price_precision: 1,
            quantity_precision: 3,
            tick_size: None,
        }
    }
}

impl PaperConfig {
    /// Contract metadata for the simulated symbol
    pub fn contract_info(&self) -> ContractInfo {
        ContractInfo {
            price_precision: self.price_precision,
            quantity_precision: self.quantity_precision,
            tick_size: self.tick_size,
        }
    }
}

/// Paper run driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Number of bars to simulate
    #[serde(default = "default_bars")]
    pub bars: u64,
    /// Wall-clock length of one bar
    #[serde(default = "default_bar_interval_ms")]
    pub bar_interval_ms: u64,
    /// Place a new entry every N bars
    #[serde(default = "default_place_every_bars")]
    pub place_every_bars: u64,
    /// Distance of the limit price from the current price
    #[serde(default = "default_entry_offset_pct")]
    pub entry_offset_pct: Decimal,
    #[serde(default = "default_order_quantity")]
    pub order_quantity: Decimal,
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: Decimal,
    #[serde(default = "default_take_profit_pct")]
    pub take_profit_pct: Decimal,
    /// Overrides `orders.default_max_wait_bars` for entries placed by the driver
    #[serde(default)]
    pub max_wait_bars: Option<u64>,
}

fn default_symbol() -> String {
    "BTCUSDT".to_string()
}
fn default_strategy() -> String {
    "pullback".to_string()
}
fn default_bars() -> u64 {
    60
}
fn default_bar_interval_ms() -> u64 {
    1000
}
fn default_place_every_bars() -> u64 {
    4
}
fn default_entry_offset_pct() -> Decimal {
    Decimal::new(2, 3) // 0.002 = 0.2%
}
fn default_order_quantity() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_stop_loss_pct() -> Decimal {
    Decimal::new(1, 2) // 1%
}
fn default_take_profit_pct() -> Decimal {
    Decimal::new(2, 2) // 2%
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            strategy: default_strategy(),
            bars: default_bars(),
            bar_interval_ms: default_bar_interval_ms(),
            place_every_bars: default_place_every_bars(),
            entry_offset_pct: default_entry_offset_pct(),
            order_quantity: default_order_quantity(),
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            max_wait_bars: None,
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifierConfig {
    #[serde(default)]
    pub mode: NotifierMode,
    /// Channel capacity for `channel` mode
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer: usize,
}

fn default_channel_buffer() -> usize {
    256
}

/// Where notifications go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierMode {
    /// Drop notifications
    None,
    /// Write notifications to the log
    #[default]
    Log,
    /// Deliver notifications over a channel
    Channel,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
