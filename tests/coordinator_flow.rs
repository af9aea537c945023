//! End-to-end pipeline tests: discovery event in, trade out.

mod common;

use common::Fixture;
use pool_sniper::{Coordinator, DiscoveryEvent, PipelineOutcome};
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

#[tokio::test]
async fn test_approved_pool_is_traded() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("pool-tx", fixture.token, fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let handle = coordinator.dispatch(DiscoveryEvent::new("pool-tx")).unwrap();
    let outcome = handle.await.unwrap();

    assert!(matches!(outcome, PipelineOutcome::Trading { token } if token == fixture.token));
    assert_eq!(coordinator.orchestrator().cached(&fixture.token), Some(true));
    assert!(!coordinator.is_busy());
}

#[tokio::test]
async fn test_native_side_listed_first_still_targets_token() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("pool-tx", fixture.native_mint, fixture.token);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let outcome = coordinator
        .dispatch(DiscoveryEvent::new("pool-tx"))
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Trading { token } if token == fixture.token));
}

#[tokio::test]
async fn test_duplicate_event_does_nothing() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("pool-tx", fixture.token, fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    coordinator
        .dispatch(DiscoveryEvent::new("pool-tx"))
        .unwrap()
        .await
        .unwrap();
    let calls = fixture.remote_calls();
    let stats = coordinator.scheduler().stats();

    assert!(coordinator.dispatch(DiscoveryEvent::new("pool-tx")).is_none());
    assert_eq!(coordinator.admitted(), 1);
    assert_eq!(fixture.remote_calls(), calls);
    assert_eq!(coordinator.scheduler().stats(), stats);
}

#[tokio::test]
async fn test_busy_pipeline_drops_events() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("first", fixture.token, fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let first = coordinator.dispatch(DiscoveryEvent::new("first")).unwrap();
    assert!(coordinator.is_busy());
    assert!(coordinator.dispatch(DiscoveryEvent::new("second")).is_none());

    first.await.unwrap();
    assert_eq!(coordinator.admitted(), 1);
    assert!(!coordinator.is_busy());
}

#[tokio::test]
async fn test_native_pair_runs_no_checks() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("native-tx", fixture.native_mint, fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let outcome = coordinator
        .dispatch(DiscoveryEvent::new("native-tx"))
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::NativePairSkipped));
    assert_eq!(fixture.registry.calls(), 0);
    assert_eq!(fixture.chain.calls(), 1);
    assert_eq!(coordinator.orchestrator().cache_len(), 0);
}

#[tokio::test]
async fn test_rejected_token_is_not_traded() {
    let fixture = Fixture::healthy();
    fixture.chain.set_holders(&[common::TOKEN_SUPPLY]);
    fixture.chain.set_balance(0);
    fixture.pool_creation("pool-tx", fixture.token, fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let outcome = coordinator
        .dispatch(DiscoveryEvent::new("pool-tx"))
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::Rejected { .. }));
    assert_eq!(coordinator.orchestrator().cached(&fixture.token), Some(false));
}

#[tokio::test]
async fn test_unknown_transaction_fails_resolution() {
    let fixture = Fixture::healthy();
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());

    let outcome = coordinator
        .dispatch(DiscoveryEvent::new("missing-tx"))
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(outcome, PipelineOutcome::ResolveFailed(_)));
    assert_eq!(coordinator.orchestrator().cache_len(), 0);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let fixture = Fixture::healthy();
    fixture.pool_creation("pool-tx", Pubkey::new_unique(), fixture.native_mint);
    let coordinator = Coordinator::new(&fixture.config(), fixture.ids(), fixture.gateways());
    let (events, receiver) = mpsc::channel(8);
    let (shutdown_tx, shutdown) = watch::channel(false);

    let running = tokio::spawn(coordinator.clone().run(receiver, shutdown));
    events.send(DiscoveryEvent::new("pool-tx")).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        while coordinator.admitted() == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("event should be admitted");

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("coordinator should stop")
        .unwrap();
}
