//! Unit tests for directional close-all

use chrono::Utc;
use sentrix::config::EngineConfig;
use sentrix::models::position::{CloseReason, Direction, PositionStatus};
use sentrix::positions::dispatcher::DirectionalCloseDispatcher;
use sentrix::positions::store::{InMemoryPositionStore, PositionStore};
use sentrix::positions::supervisor::PositionSupervisor;
use std::sync::Arc;

use crate::positions_support::{open_position, MockExecution, ScriptedMarketData};

struct Fixture {
    store: Arc<InMemoryPositionStore>,
    executor: Arc<MockExecution>,
    dispatcher: DirectionalCloseDispatcher,
}

fn fixture() -> Fixture {
    let store = Arc::new(InMemoryPositionStore::new());
    let market_data = Arc::new(ScriptedMarketData::new());
    let executor = Arc::new(MockExecution::filling_at(100.0));
    let supervisor = Arc::new(PositionSupervisor::new(
        store.clone(),
        market_data,
        executor.clone(),
        EngineConfig::default(),
        None,
    ));
    let dispatcher = DirectionalCloseDispatcher::new(store.clone(), supervisor);
    Fixture {
        store,
        executor,
        dispatcher,
    }
}

#[tokio::test]
async fn test_close_all_closes_only_requested_side() {
    let f = fixture();
    let long_a = open_position("BTC-PERP", Direction::Long, 100.0, 98.0, 104.0, Utc::now());
    let long_b = open_position("BTC-PERP", Direction::Long, 102.0, 99.0, 106.0, Utc::now());
    let short = open_position("BTC-PERP", Direction::Short, 100.0, 102.0, 96.0, Utc::now());
    f.store.insert(&long_a).await.unwrap();
    f.store.insert(&long_b).await.unwrap();
    f.store.insert(&short).await.unwrap();

    let report = f.dispatcher.close_all(Direction::Long).await.unwrap();
    assert_eq!(report.positions_found, 2);
    assert_eq!(report.instructions_issued, 2);
    assert_eq!(f.executor.close_count(), 2);

    for id in [long_a.id, long_b.id] {
        let closed = f.store.get(id).await.unwrap().unwrap();
        assert_eq!(closed.status, PositionStatus::Closed);
        assert_eq!(closed.close_reason, Some(CloseReason::DirectionalSignal));
    }
    let untouched = f.store.get(short.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, PositionStatus::Open);
}

#[tokio::test]
async fn test_close_all_is_idempotent() {
    let f = fixture();
    let long = open_position("BTC-PERP", Direction::Long, 100.0, 98.0, 104.0, Utc::now());
    f.store.insert(&long).await.unwrap();

    let first = f.dispatcher.close_all(Direction::Long).await.unwrap();
    let second = f.dispatcher.close_all(Direction::Long).await.unwrap();

    assert_eq!(first.instructions_issued, 1);
    assert_eq!(second.positions_found, 0);
    assert_eq!(second.instructions_issued, 0);
    assert_eq!(f.executor.close_count(), 1);
}

#[tokio::test]
async fn test_close_all_excludes_positions_mid_close() {
    let f = fixture();
    let long = open_position("BTC-PERP", Direction::Long, 100.0, 98.0, 104.0, Utc::now());
    f.store.insert(&long).await.unwrap();
    f.store
        .transition(long.id, PositionStatus::Open, PositionStatus::Closing)
        .await
        .unwrap();

    let report = f.dispatcher.close_all(Direction::Long).await.unwrap();
    assert_eq!(report.positions_found, 0);
    assert_eq!(report.instructions_issued, 0);
    assert_eq!(f.executor.close_count(), 0);
}
