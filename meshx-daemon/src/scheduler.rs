//! Catch-up scheduling
//!
//! Polls the node head on a fixed interval and enqueues every height after
//! the last enqueued one, in ascending order. The scheduler never renders
//! and never reads the renderer's state; `last_enqueued` is its own.

use std::sync::Arc;
use std::time::Duration;

use meshx_rpc::BlockSource;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::{DaemonError, Result};

pub struct CatchUpScheduler<S> {
    source: Arc<S>,
    queue: mpsc::Sender<u64>,
    last_enqueued: u64,
    interval: Duration,
    consecutive_failures: u32,
}

impl<S: BlockSource> CatchUpScheduler<S> {
    /// `floor` is the highest height treated as already handled; the first
    /// height enqueued is `floor + 1`.
    pub fn new(source: Arc<S>, queue: mpsc::Sender<u64>, floor: u64, interval: Duration) -> Self {
        Self {
            source,
            queue,
            last_enqueued: floor,
            interval,
            consecutive_failures: 0,
        }
    }

    pub fn last_enqueued(&self) -> u64 {
        self.last_enqueued
    }

    /// Look up the head once and enqueue whatever is missing.
    /// Returns the number of heights enqueued.
    pub async fn tick(&mut self) -> Result<u64> {
        let head = self.source.head().await?;
        self.enqueue_through(head.height).await
    }

    /// Enqueue `last_enqueued + 1 ..= head_height`, blocking while the queue is full
    pub async fn enqueue_through(&mut self, head_height: u64) -> Result<u64> {
        if head_height <= self.last_enqueued {
            tracing::trace!("Head {} already enqueued (last {})", head_height, self.last_enqueued);
            return Ok(0);
        }

        let first = self.last_enqueued + 1;
        for height in first..=head_height {
            self.queue
                .send(height)
                .await
                .map_err(|_| DaemonError::QueueClosed)?;
            self.last_enqueued = height;
        }

        if head_height > first {
            tracing::info!("Catching up: enqueued blocks {}-{}", first, head_height);
        } else {
            tracing::debug!("Enqueued block {}", head_height);
        }

        Ok(head_height - first + 1)
    }

    /// Poll until shutdown or until the renderer drops the queue
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            "Starting scheduler from height {} (every {:?})",
            self.last_enqueued + 1,
            self.interval
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            // A cancelled send leaves last_enqueued at the last height actually queued
            let result = tokio::select! {
                result = self.tick() => result,
                _ = shutdown.changed() => break,
            };

            match result {
                Ok(_) => {
                    if self.consecutive_failures > 0 {
                        tracing::info!(
                            "Node reachable again after {} failed polls",
                            self.consecutive_failures
                        );
                    }
                    self.consecutive_failures = 0;
                }
                Err(DaemonError::QueueClosed) => {
                    tracing::info!("Work queue closed, scheduler stopping");
                    break;
                }
                Err(e) => {
                    self.consecutive_failures += 1;
                    tracing::warn!(
                        "Head lookup failed ({} in a row): {}",
                        self.consecutive_failures,
                        e
                    );
                }
            }
        }

        Ok(())
    }
}
