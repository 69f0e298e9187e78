//! Shared test fixtures: a scripted chain and a recording template

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use meshx_daemon::render::{PageData, PageTemplate};
use meshx_rpc::{BlockEnvelope, BlockSource, Error, Result};

/// In-memory chain with scripted head observations
#[derive(Default)]
pub struct MockChain {
    /// `None` entries simulate an unreachable node
    heads: Mutex<VecDeque<Option<u64>>>,
    last_head: Mutex<u64>,
    blocks: Mutex<HashMap<u64, BlockEnvelope>>,
    block_failures: Mutex<u32>,
    block_calls: Mutex<Vec<u64>>,
}

pub fn hash_for(height: u64) -> String {
    format!("H{}", height)
}

pub fn block(height: u64, transactions: Vec<String>) -> BlockEnvelope {
    BlockEnvelope {
        hash: hash_for(height),
        prev_hash: if height > 1 { hash_for(height - 1) } else { String::new() },
        height,
        transactions,
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain of empty blocks `1..=tip`
    pub fn with_blocks(tip: u64) -> Self {
        let chain = Self::new();
        for height in 1..=tip {
            chain.insert(block(height, Vec::new()));
        }
        chain
    }

    pub fn insert(&self, block: BlockEnvelope) {
        self.blocks.lock().unwrap().insert(block.height, block);
    }

    pub fn script_heads(&self, heads: &[Option<u64>]) {
        self.heads.lock().unwrap().extend(heads.iter().copied());
    }

    /// Make the next `n` block fetches fail as unavailable
    pub fn fail_next_blocks(&self, n: u32) {
        *self.block_failures.lock().unwrap() = n;
    }

    pub fn block_calls(&self) -> Vec<u64> {
        self.block_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlockSource for MockChain {
    async fn head(&self) -> Result<BlockEnvelope> {
        let next = self.heads.lock().unwrap().pop_front();
        let height = match next {
            Some(Some(height)) => {
                *self.last_head.lock().unwrap() = height;
                height
            }
            Some(None) => return Err(Error::Unavailable("scripted outage".to_string())),
            None => *self.last_head.lock().unwrap(),
        };
        Ok(block(height, Vec::new()))
    }

    async fn block_at(&self, height: u64) -> Result<BlockEnvelope> {
        self.block_calls.lock().unwrap().push(height);
        {
            let mut failures = self.block_failures.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(Error::Unavailable("scripted outage".to_string()));
            }
        }
        self.blocks
            .lock()
            .unwrap()
            .get(&height)
            .cloned()
            .ok_or_else(|| Error::Malformed(format!("no block {}", height)))
    }
}

/// Renders pages as JSON and remembers every page it was asked for
#[derive(Clone, Default)]
pub struct RecordingTemplate {
    pub pages: Arc<Mutex<Vec<PageData>>>,
}

impl RecordingTemplate {
    pub fn rendered(&self) -> Vec<PageData> {
        self.pages.lock().unwrap().clone()
    }
}

impl PageTemplate for RecordingTemplate {
    fn render(&self, page: &PageData) -> Vec<u8> {
        self.pages.lock().unwrap().push(page.clone());
        serde_json::to_vec(page).unwrap()
    }
}

pub fn read_page(path: &std::path::Path) -> PageData {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}
