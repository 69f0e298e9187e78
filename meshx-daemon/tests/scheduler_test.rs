mod common;

use std::sync::Arc;
use std::time::Duration;

use common::MockChain;
use meshx_daemon::scheduler::CatchUpScheduler;
use meshx_daemon::DaemonError;
use tokio::sync::{mpsc, watch};

fn drain(rx: &mut mpsc::Receiver<u64>) -> Vec<u64> {
    let mut heights = Vec::new();
    while let Ok(height) = rx.try_recv() {
        heights.push(height);
    }
    heights
}

#[tokio::test]
async fn test_unchanged_then_jump() {
    let chain = Arc::new(MockChain::new());
    chain.script_heads(&[Some(1), Some(1), Some(4)]);
    let (tx, mut rx) = mpsc::channel(16);
    let mut scheduler = CatchUpScheduler::new(chain, tx, 1, Duration::from_millis(10));

    assert_eq!(scheduler.tick().await.unwrap(), 0);
    assert_eq!(scheduler.tick().await.unwrap(), 0);
    assert_eq!(scheduler.tick().await.unwrap(), 3);

    assert_eq!(drain(&mut rx), vec![2, 3, 4]);
    assert_eq!(scheduler.last_enqueued(), 4);
}

#[tokio::test]
async fn test_monotonic_heads_enqueue_every_height_once() {
    let chain = Arc::new(MockChain::new());
    chain.script_heads(&[Some(3), Some(3), Some(7), Some(8), Some(8), Some(15)]);
    let (tx, mut rx) = mpsc::channel(64);
    let mut scheduler = CatchUpScheduler::new(chain, tx, 0, Duration::from_millis(10));

    for _ in 0..8 {
        scheduler.tick().await.unwrap();
    }

    assert_eq!(drain(&mut rx), (1..=15).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_head_failure_leaves_progress_intact() {
    let chain = Arc::new(MockChain::new());
    chain.script_heads(&[Some(2), None, Some(5)]);
    let (tx, mut rx) = mpsc::channel(16);
    let mut scheduler = CatchUpScheduler::new(chain, tx, 0, Duration::from_millis(10));

    scheduler.tick().await.unwrap();
    assert!(matches!(scheduler.tick().await, Err(DaemonError::Rpc(_))));
    assert_eq!(scheduler.last_enqueued(), 2);
    scheduler.tick().await.unwrap();

    assert_eq!(drain(&mut rx), vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn test_full_queue_blocks_instead_of_dropping() {
    let chain = Arc::new(MockChain::new());
    let (tx, mut rx) = mpsc::channel(2);
    let mut scheduler = CatchUpScheduler::new(chain, tx, 0, Duration::from_millis(10));

    let handle = tokio::spawn(async move {
        scheduler.enqueue_through(5).await.unwrap();
        scheduler
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());

    let mut received = Vec::new();
    while received.len() < 5 {
        received.push(rx.recv().await.unwrap());
    }
    let scheduler = handle.await.unwrap();

    assert_eq!(received, vec![1, 2, 3, 4, 5]);
    assert_eq!(scheduler.last_enqueued(), 5);
}

#[tokio::test]
async fn test_closed_queue_is_reported() {
    let chain = Arc::new(MockChain::new());
    let (tx, rx) = mpsc::channel(4);
    drop(rx);
    let mut scheduler = CatchUpScheduler::new(chain, tx, 0, Duration::from_millis(10));

    assert!(matches!(scheduler.enqueue_through(1).await, Err(DaemonError::QueueClosed)));
    assert_eq!(scheduler.last_enqueued(), 0);
}

#[tokio::test]
async fn test_run_polls_until_shutdown() {
    let chain = Arc::new(MockChain::new());
    chain.script_heads(&[Some(2), None, Some(3)]);
    let (tx, mut rx) = mpsc::channel(16);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = CatchUpScheduler::new(chain, tx, 0, Duration::from_millis(5));

    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    let mut received = Vec::new();
    while received.len() < 3 {
        let height = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        received.push(height);
    }
    assert_eq!(received, vec![1, 2, 3]);

    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
