//! Pending order store

use super::PendingOrder;
use std::collections::HashMap;

/// Tracked orders by exchange order id
#[derive(Debug, Default)]
pub struct PendingOrderStore {
    orders: HashMap<String, PendingOrder>,
}

impl PendingOrderStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Track an order; hands it back if the id is already tracked
    pub fn insert(&mut self, order: PendingOrder) -> Result<(), PendingOrder> {
        if self.orders.contains_key(&order.order_id) {
            return Err(order);
        }
        self.orders.insert(order.order_id.clone(), order);
        Ok(())
    }

    /// Stop tracking an order. Returns it only the first time.
    pub fn remove(&mut self, order_id: &str) -> Option<PendingOrder> {
        self.orders.remove(order_id)
    }

    pub fn get(&self, order_id: &str) -> Option<&PendingOrder> {
        self.orders.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PendingOrder> {
        self.orders.values_mut()
    }

    /// Orders belonging to a strategy
    pub fn by_strategy<'a>(&'a self, strategy: &'a str) -> impl Iterator<Item = &'a PendingOrder> {
        self.orders.values().filter(move |o| o.strategy == strategy)
    }

    /// Owned copy of every tracked order
    pub fn snapshot(&self) -> Vec<PendingOrder> {
        self.orders.values().cloned().collect()
    }

    /// Remove everything, returning the number of orders dropped
    pub fn clear(&mut self) -> usize {
        let count = self.orders.len();
        self.orders.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::{Direction, SignalData};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn pending(order_id: &str, strategy: &str) -> PendingOrder {
        PendingOrder {
            order_id: order_id.to_string(),
            client_order_id: Uuid::new_v4(),
            symbol: "BTCUSDT".to_string(),
            strategy: strategy.to_string(),
            direction: Direction::Long,
            limit_price: dec!(50000),
            quantity: dec!(0.01),
            stop_loss: dec!(49000),
            take_profit: dec!(52000),
            signal_data: SignalData::default(),
            created_bar: 0,
            max_wait_bars: 3,
            bars_waited: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let mut store = PendingOrderStore::new();
        assert!(store.insert(pending("1", "a")).is_ok());

        let duplicate = store.insert(pending("1", "b")).unwrap_err();
        assert_eq!(duplicate.strategy, "b");
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().strategy, "a");
    }

    #[test]
    fn test_remove_returns_order_once() {
        let mut store = PendingOrderStore::new();
        store.insert(pending("1", "a")).unwrap();

        assert!(store.remove("1").is_some());
        assert!(store.remove("1").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_by_strategy() {
        let mut store = PendingOrderStore::new();
        store.insert(pending("1", "a")).unwrap();
        store.insert(pending("2", "b")).unwrap();
        store.insert(pending("3", "a")).unwrap();

        let mut ids: Vec<_> = store.by_strategy("a").map(|o| o.order_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(store.by_strategy("c").count(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut store = PendingOrderStore::new();
        store.insert(pending("1", "a")).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(store.clear(), 1);
        assert_eq!(snapshot.len(), 1);
        assert!(store.is_empty());
        assert!(store.get("1").is_none());
    }
}
