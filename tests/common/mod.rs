//! Shared test doubles

#![allow(dead_code)]

use async_trait::async_trait;
use limit_order_lifecycle::exchange::{
    ContractInfo, ExchangeClient, ExchangeError, OrderReport, OrderRequest, OrderStatus,
    PlaceOrderResponse,
};
use limit_order_lifecycle::notify::{Notifier, NotifyEvent};
use limit_order_lifecycle::orders::{Direction, OrderParams, SignalData};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// Exchange call, as recorded by [`ScriptedExchange`]
#[derive(Debug, Clone)]
pub enum Call {
    Place(OrderRequest),
    Get(String),
    Cancel(String),
}

#[derive(Default)]
struct Script {
    place: VecDeque<Result<PlaceOrderResponse, ExchangeError>>,
    statuses: HashMap<String, VecDeque<Result<OrderReport, ExchangeError>>>,
    cancels: HashMap<String, ExchangeError>,
    cancel_all_fail: Option<ExchangeError>,
    panic_on_get: HashSet<String>,
    calls: Vec<Call>,
}

/// Exchange that replays scripted responses
///
/// Status scripts are consumed front to back; the last entry repeats. Orders
/// without a script report `NEW`. Cancels succeed unless told otherwise.
#[derive(Default)]
pub struct ScriptedExchange {
    script: Mutex<Script>,
}

impl ScriptedExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_place(&self, response: Result<PlaceOrderResponse, ExchangeError>) {
        self.script.lock().unwrap().place.push_back(response);
    }

    pub fn accept(&self, order_id: &str) {
        self.queue_place(Ok(PlaceOrderResponse::accepted(order_id)));
    }

    pub fn script_status(
        &self,
        order_id: &str,
        responses: Vec<Result<OrderReport, ExchangeError>>,
    ) {
        self.script
            .lock()
            .unwrap()
            .statuses
            .insert(order_id.to_string(), responses.into());
    }

    pub fn fail_cancel(&self, order_id: &str, error: ExchangeError) {
        self.script
            .lock()
            .unwrap()
            .cancels
            .insert(order_id.to_string(), error);
    }

    pub fn fail_all_cancels(&self, error: ExchangeError) {
        self.script.lock().unwrap().cancel_all_fail = Some(error);
    }

    pub fn panic_on_get(&self, order_id: &str) {
        self.script
            .lock()
            .unwrap()
            .panic_on_get
            .insert(order_id.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Cancel(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Get(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn placed_requests(&self) -> Vec<OrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Place(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ExchangeClient for ScriptedExchange {
    async fn place_order(
        &self,
        request: &OrderRequest,
    ) -> Result<PlaceOrderResponse, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Place(request.clone()));
        script
            .place
            .pop_front()
            .unwrap_or_else(|| Err(ExchangeError::Unknown("no scripted placement".to_string())))
    }

    async fn get_order(&self, _symbol: &str, order_id: &str) -> Result<OrderReport, ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Get(order_id.to_string()));
        if script.panic_on_get.contains(order_id) {
            drop(script);
            panic!("exchange client bug for {}", order_id);
        }
        match script.statuses.get_mut(order_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(OrderReport::with_status(OrderStatus::New))),
            None => Ok(OrderReport::with_status(OrderStatus::New)),
        }
    }

    async fn cancel_order(&self, _symbol: &str, order_id: &str) -> Result<(), ExchangeError> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(Call::Cancel(order_id.to_string()));
        if let Some(err) = &script.cancel_all_fail {
            return Err(err.clone());
        }
        match script.cancels.get(order_id) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn ping(&self) -> Result<(), ExchangeError> {
        Ok(())
    }
}

/// Notifier that keeps every event
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotifyEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_limit_order_filled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        fill_price: Decimal,
        quantity: Decimal,
        bars_waited: u64,
    ) {
        self.events.lock().unwrap().push(NotifyEvent::Filled {
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            direction,
            fill_price,
            quantity,
            bars_waited,
        });
    }

    fn notify_limit_order_cancelled(
        &self,
        strategy: &str,
        symbol: &str,
        direction: Direction,
        limit_price: Decimal,
        reason: &str,
    ) {
        self.events.lock().unwrap().push(NotifyEvent::Cancelled {
            strategy: strategy.to_string(),
            symbol: symbol.to_string(),
            direction,
            limit_price,
            reason: reason.to_string(),
        });
    }
}

pub fn eurusd_contract() -> ContractInfo {
    ContractInfo::new(4, 0)
}

pub fn params(strategy: &str, limit_price: Decimal, quantity: Decimal) -> OrderParams {
    OrderParams {
        symbol: "EURUSD".to_string(),
        strategy: strategy.to_string(),
        direction: Direction::Long,
        limit_price,
        quantity,
        stop_loss: limit_price - dec!(0.0050),
        take_profit: limit_price + dec!(0.0100),
        signal_data: SignalData::default(),
    }
}
