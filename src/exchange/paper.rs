//! Paper trading exchange with simulated limit fills

use super::{
    ExchangeClient, ExchangeError, OrderReport, OrderRequest, OrderSide, OrderStatus,
    PlaceOrderResponse, CODE_UNKNOWN_ORDER,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Resting order on the paper venue
#[derive(Debug, Clone)]
struct PaperOrder {
    symbol: String,
    side: OrderSide,
    price: Decimal,
    quantity: Decimal,
    status: OrderStatus,
    avg_price: Option<Decimal>,
    executed_qty: Option<Decimal>,
}

#[derive(Debug)]
struct PaperState {
    next_id: u64,
    orders: HashMap<String, PaperOrder>,
    connected: bool,
}

/// In-memory exchange
///
/// Limit orders rest as `NEW` until a price update touches them: a buy fills
/// when the price trades at or below its limit, a sell at or above. Fills
/// happen in full at the limit price.
#[derive(Clone)]
pub struct PaperExchange {
    state: Arc<RwLock<PaperState>>,
}

impl PaperExchange {
    /// Create a new paper exchange
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PaperState {
                next_id: 1,
                orders: HashMap::new(),
                connected: true,
            })),
        }
    }

    /// Feed a trade price; returns the ids of orders filled by it
    pub async fn update_price(&self, symbol: &str, price: Decimal) -> Vec<String> {
        let mut state = self.state.write().await;
        let mut filled = Vec::new();

        for (order_id, order) in state.orders.iter_mut() {
            if order.symbol != symbol || order.status != OrderStatus::New {
                continue;
            }
            let touched = match order.side {
                OrderSide::Buy => price <= order.price,
                OrderSide::Sell => price >= order.price,
            };
            if touched {
                order.status = OrderStatus::Filled;
                order.avg_price = Some(order.price);
                order.executed_qty = Some(order.quantity);
                filled.push(order_id.clone());
            }
        }

        if !filled.is_empty() {
            tracing::debug!(symbol, %price, count = filled.len(), "Paper orders filled");
        }
        filled
    }

    /// Simulate losing or regaining connectivity
    pub async fn set_connected(&self, connected: bool) {
        self.state.write().await.connected = connected;
    }

    /// Number of orders still resting
    pub async fn open_order_count(&self) -> usize {
        self.state
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.status == OrderStatus::New)
            .count()
    }

    /// Current status of an order, if the venue knows it
    pub async fn order_status(&self, order_id: &str) -> Option<OrderStatus> {
        self.state
            .read()
            .await
            .orders
            .get(order_id)
            .map(|o| o.status.clone())
    }
}

impl Default for PaperExchange {
    fn default() -> Self {
        Self::new()
    }
}

fn disconnected() -> ExchangeError {
    ExchangeError::Transient("paper exchange disconnected".to_string())
}

#[async_trait]
impl ExchangeClient for PaperExchange {
    async fn place_order(
        &self,
        request: &OrderRequest,
    ) -> Result<PlaceOrderResponse, ExchangeError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(disconnected());
        }
        if request.price <= Decimal::ZERO || request.quantity <= Decimal::ZERO {
            return Err(ExchangeError::rejected(
                -1013,
                "Price and quantity must be positive",
            ));
        }

        let order_id = state.next_id.to_string();
        state.next_id += 1;
        state.orders.insert(
            order_id.clone(),
            PaperOrder {
                symbol: request.symbol.clone(),
                side: request.side,
                price: request.price,
                quantity: request.quantity,
                status: OrderStatus::New,
                avg_price: None,
                executed_qty: None,
            },
        );

        tracing::info!(
            %order_id,
            symbol = %request.symbol,
            side = ?request.side,
            price = %request.price,
            "Paper order placed"
        );
        Ok(PlaceOrderResponse::accepted(order_id))
    }

    async fn get_order(&self, _symbol: &str, order_id: &str) -> Result<OrderReport, ExchangeError> {
        let state = self.state.read().await;
        if !state.connected {
            return Err(disconnected());
        }
        let order = state
            .orders
            .get(order_id)
            .ok_or_else(|| ExchangeError::NotFound(order_id.to_string()))?;

        Ok(OrderReport {
            status: order.status.clone(),
            avg_price: order.avg_price,
            executed_qty: order.executed_qty,
        })
    }

    async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(disconnected());
        }
        match state.orders.get_mut(order_id) {
            Some(order) if order.status == OrderStatus::New => {
                order.status = OrderStatus::Canceled;
                tracing::info!(%order_id, "Paper order cancelled");
                Ok(())
            }
            _ => Err(ExchangeError::rejected(CODE_UNKNOWN_ORDER, "Unknown order sent.")),
        }
    }

    async fn ping(&self) -> Result<(), ExchangeError> {
        if self.state.read().await.connected {
            Ok(())
        } else {
            Err(disconnected())
        }
    }
}
