//! Cancellation integration tests

mod common;

use common::{eurusd_contract, params, RecordingNotifier, ScriptedExchange};
use limit_order_lifecycle::exchange::{ExchangeError, PaperExchange, CODE_UNKNOWN_ORDER};
use limit_order_lifecycle::notify::NotifyEvent;
use limit_order_lifecycle::orders::{ManagerConfig, OrderLifecycleManager};
use rust_decimal_macros::dec;
use std::sync::Arc;

async fn manager_with_orders(
    exchange: &Arc<ScriptedExchange>,
    notifier: &Arc<RecordingNotifier>,
    ids: &[&str],
) -> OrderLifecycleManager {
    let mut manager =
        OrderLifecycleManager::new(exchange.clone(), notifier.clone(), ManagerConfig::default());
    for id in ids {
        exchange.accept(id);
        manager
            .create_pending_order(params("s", dec!(1.1), dec!(1)), 0, None, &eurusd_contract())
            .await
            .unwrap();
    }
    manager
}

#[tokio::test]
async fn test_cancel_all_on_empty_store() {
    let exchange = Arc::new(ScriptedExchange::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = manager_with_orders(&exchange, &notifier, &[]).await;

    assert_eq!(manager.cancel_all_pending_orders().await, 0);
    assert!(exchange.calls().is_empty());
}

#[tokio::test]
async fn test_cancel_all_drains_when_every_cancel_fails() {
    let exchange = Arc::new(ScriptedExchange::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = manager_with_orders(&exchange, &notifier, &["a", "b", "c", "d", "e"]).await;

    exchange.fail_all_cancels(ExchangeError::Transient("exchange down".to_string()));

    assert_eq!(manager.cancel_all_pending_orders().await, 0);
    assert_eq!(manager.get_pending_count(), 0);
    assert_eq!(exchange.cancel_calls().len(), 5);
    assert_eq!(manager.stats().cancelled, 5);
}

#[tokio::test]
async fn test_cancel_all_counts_successful_cancels() {
    let exchange = Arc::new(ScriptedExchange::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = manager_with_orders(&exchange, &notifier, &["a", "b", "c"]).await;

    exchange.fail_cancel("b", ExchangeError::rejected(CODE_UNKNOWN_ORDER, "Unknown order sent."));

    assert_eq!(manager.cancel_all_pending_orders().await, 2);
    assert_eq!(manager.get_pending_count(), 0);

    // second call finds nothing to do
    assert_eq!(manager.cancel_all_pending_orders().await, 0);
    assert_eq!(exchange.cancel_calls().len(), 3);
}

#[tokio::test]
async fn test_single_cancel_treats_already_resolved_as_benign() {
    let exchange = Arc::new(ScriptedExchange::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let manager = manager_with_orders(&exchange, &notifier, &[]).await;

    exchange.fail_cancel(
        "gone",
        ExchangeError::rejected(CODE_UNKNOWN_ORDER, "Unknown order sent."),
    );
    exchange.fail_cancel("flaky", ExchangeError::Unknown("malformed body".to_string()));

    assert!(manager.cancel_order("EURUSD", "live").await);
    assert!(!manager.cancel_order("EURUSD", "gone").await);
    assert!(!manager.cancel_order("EURUSD", "flaky").await);
}

#[tokio::test]
async fn test_cancel_pending_order_notifies_and_untracks() {
    let exchange = Arc::new(ScriptedExchange::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let mut manager = manager_with_orders(&exchange, &notifier, &["a", "b"]).await;

    exchange.fail_cancel("a", ExchangeError::Transient("timeout".to_string()));

    assert!(!manager.cancel_pending_order("a").await);
    assert!(manager.get_pending_order("a").is_none());
    assert!(manager.cancel_pending_order("b").await);
    assert_eq!(manager.get_pending_count(), 0);

    let reasons: Vec<_> = notifier
        .events()
        .into_iter()
        .map(|e| match e {
            NotifyEvent::Cancelled { reason, .. } => reason,
            other => panic!("unexpected event: {:?}", other),
        })
        .collect();
    assert_eq!(reasons, vec!["Cancelled by caller", "Cancelled by caller"]);
}

#[tokio::test]
async fn test_shutdown_cancels_resting_paper_orders() {
    let exchange = Arc::new(PaperExchange::new());
    let mut manager = OrderLifecycleManager::with_exchange(exchange.clone());

    for price in [dec!(1.10), dec!(1.09), dec!(1.08)] {
        manager
            .create_pending_order(params("s", price, dec!(1)), 0, None, &eurusd_contract())
            .await
            .unwrap();
    }
    // one of them fills before shutdown
    exchange.update_price("EURUSD", dec!(1.095)).await;

    assert_eq!(manager.cancel_all_pending_orders().await, 2);
    assert_eq!(manager.get_pending_count(), 0);
    assert_eq!(exchange.open_order_count().await, 0);
}
