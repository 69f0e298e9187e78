//! Block rendering
//!
//! The single consumer of the work queue. Each height is fetched, its
//! transactions decoded, and the summary, block and previous-block pages
//! written. The renderer alone owns the record of the last rendered block.

mod page;
mod template;

pub use page::{
    decode_all, placeholder_html, render_pages, transactions_html, DecodeFailure, PageData,
    RenderedBlockRecord, RenderedPages,
};
pub use template::{FileTemplate, HtmlTemplate, PageTemplate};

use std::sync::Arc;

use meshx_rpc::{BlockEnvelope, BlockSource};
use tokio::sync::{mpsc, watch};

use crate::config::RetryConfig;
use crate::retry::Backoff;
use crate::store::{is_safe_page_name, PageStore};
use crate::{DaemonError, Result};

/// What happened to one height
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOutcome {
    pub height: u64,
    pub hash: String,
    pub tx_count: usize,
    /// The predecessor's page was rewritten with a forward link
    pub linked_previous: bool,
    /// Transactions were replaced by a decode-failure placeholder
    pub placeholder: bool,
}

/// Renders queued heights in order
pub struct BlockRenderer<S, T> {
    source: Arc<S>,
    template: T,
    store: PageStore,
    queue: mpsc::Receiver<u64>,
    retry: RetryConfig,
    previous: Option<RenderedBlockRecord>,
}

impl<S: BlockSource, T: PageTemplate> BlockRenderer<S, T> {
    pub fn new(
        source: Arc<S>,
        template: T,
        store: PageStore,
        queue: mpsc::Receiver<u64>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            source,
            template,
            store,
            queue,
            retry,
            previous: None,
        }
    }

    /// Resume from a block rendered by an earlier run
    pub fn with_previous(mut self, previous: Option<RenderedBlockRecord>) -> Self {
        self.previous = previous;
        self
    }

    pub fn previous(&self) -> Option<&RenderedBlockRecord> {
        self.previous.as_ref()
    }

    /// One attempt at rendering `height`. Returns `None` if the height was
    /// already rendered.
    pub async fn render_height(&mut self, height: u64) -> Result<Option<RenderOutcome>> {
        if let Some(prev) = &self.previous {
            if height <= prev.height {
                tracing::debug!("Block {} already rendered (last {}), skipping", height, prev.height);
                return Ok(None);
            }
        }

        let block = self.source.block_at(height).await?;
        check_page_names(&block)?;

        if let Some(prev) = &self.previous {
            if prev.height + 1 != block.height {
                tracing::warn!(
                    "Block {} follows last rendered block {}; previous page not linked",
                    block.height,
                    prev.height
                );
            } else if prev.hash != block.prev_hash {
                tracing::warn!(
                    "Block {} prev_hash {} does not match last rendered hash {}",
                    block.height,
                    block.prev_hash,
                    prev.hash
                );
            }
        }

        let (html, placeholder) = match decode_all(&block.transactions) {
            Ok(decoded) => (transactions_html(&decoded), false),
            Err(failure) => {
                tracing::error!(
                    "[{}/{}] Transaction decode failed, rendering placeholder: {}",
                    block.height,
                    failure.index,
                    failure.error
                );
                (placeholder_html(&failure), true)
            }
        };

        let pages = render_pages(&block, html, self.previous.as_ref());

        // This block's page first, then the predecessor's forward link, then summary
        self.store
            .write_block(&pages.block.hash, &self.template.render(&pages.block))?;
        if let Some(prev_page) = &pages.previous {
            self.store
                .write_block(&prev_page.hash, &self.template.render(prev_page))?;
        }
        self.store.write_summary(&self.template.render(&pages.summary))?;

        let outcome = RenderOutcome {
            height: block.height,
            hash: block.hash.clone(),
            tx_count: block.transactions.len(),
            linked_previous: pages.previous.is_some(),
            placeholder,
        };

        if let Err(e) = self.store.save_checkpoint(&pages.record) {
            tracing::warn!("Failed to save checkpoint at block {}: {}", block.height, e);
        }
        self.previous = Some(pages.record);

        Ok(Some(outcome))
    }

    /// Render `height`, retrying transient failures until it succeeds or
    /// shutdown is requested. Returns `false` on shutdown.
    async fn render_with_retry(
        &mut self,
        height: u64,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<bool> {
        let mut backoff = Backoff::new(&self.retry);

        loop {
            match self.render_height(height).await {
                Ok(Some(outcome)) => {
                    tracing::info!(
                        "Rendered block {} {} ({} transactions{})",
                        outcome.height,
                        outcome.hash,
                        outcome.tx_count,
                        if outcome.placeholder { ", placeholder" } else { "" }
                    );
                    return Ok(true);
                }
                Ok(None) => return Ok(true),
                Err(e) if e.is_retryable() => {
                    let delay = backoff.next_delay();
                    tracing::warn!(
                        "Failed to render block {} (attempt {}): {}. Retrying in {:?}",
                        height,
                        backoff.attempts(),
                        e,
                        delay
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = shutdown.changed() => return Ok(false),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Consume the work queue until it closes or shutdown is requested
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            "Starting renderer (last rendered: {})",
            self.previous
                .as_ref()
                .map(|r| r.height.to_string())
                .unwrap_or_else(|| "none".to_string())
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            let height = tokio::select! {
                next = self.queue.recv() => match next {
                    Some(height) => height,
                    None => {
                        tracing::info!("Work queue closed, renderer stopping");
                        break;
                    }
                },
                _ = shutdown.changed() => break,
            };

            if !self.render_with_retry(height, &mut shutdown).await? {
                break;
            }
        }

        Ok(())
    }
}

/// Hashes become file names, so they must be plain alphanumerics
fn check_page_names(block: &BlockEnvelope) -> Result<()> {
    let prev_ok = block.prev_hash.is_empty() || is_safe_page_name(&block.prev_hash);
    if !is_safe_page_name(&block.hash) || !prev_ok {
        return Err(DaemonError::Rpc(meshx_rpc::Error::Malformed(format!(
            "Block {} has unusable hash {:?} / prev_hash {:?}",
            block.height, block.hash, block.prev_hash
        ))));
    }
    Ok(())
}
