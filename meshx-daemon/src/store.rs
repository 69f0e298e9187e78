//! Rendered page storage
//!
//! Layout under the render directory:
//! - `summary.html`: latest rendered block
//! - `block/id/<hash>.html`: one page per block
//! - `checkpoint.json`: record of the last rendered block

use std::path::{Path, PathBuf};

use crate::render::RenderedBlockRecord;
use crate::{DaemonError, Result};

const SUMMARY_FILE: &str = "summary.html";
const BLOCK_DIR: &str = "block/id";
const CHECKPOINT_FILE: &str = "checkpoint.json";

/// Page files on disk
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Open a render directory, creating its layout if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(root.join(BLOCK_DIR)).map_err(|e| {
            DaemonError::Filesystem(format!("Failed to create {}: {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }

    pub fn block_path(&self, hash: &str) -> PathBuf {
        self.root.join(BLOCK_DIR).join(format!("{}.html", hash))
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(CHECKPOINT_FILE)
    }

    pub fn write_summary(&self, page: &[u8]) -> Result<()> {
        write_atomic(&self.summary_path(), page)
    }

    pub fn write_block(&self, hash: &str, page: &[u8]) -> Result<()> {
        write_atomic(&self.block_path(hash), page)
    }

    /// Load the last rendered block, if any was recorded
    pub fn load_checkpoint(&self) -> Result<Option<RenderedBlockRecord>> {
        let path = self.checkpoint_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read(&path)
            .map_err(|e| DaemonError::Checkpoint(format!("Failed to read {}: {}", path.display(), e)))?;
        let record = serde_json::from_slice(&content)
            .map_err(|e| DaemonError::Checkpoint(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(Some(record))
    }

    /// Height the scheduler starts above, and the record the renderer links from.
    ///
    /// An unreadable checkpoint is an error: starting over from `start_height`
    /// would leave the last rendered page without its next link.
    pub fn resume_point(&self, start_height: u64) -> Result<(u64, Option<RenderedBlockRecord>)> {
        match self.load_checkpoint()? {
            Some(record) => {
                tracing::info!("Resuming after block {} {}", record.height, record.hash);
                Ok((record.height, Some(record)))
            }
            None => Ok((start_height, None)),
        }
    }

    pub fn save_checkpoint(&self, record: &RenderedBlockRecord) -> Result<()> {
        let content = serde_json::to_vec_pretty(record)
            .map_err(|e| DaemonError::Checkpoint(format!("Failed to serialize checkpoint: {}", e)))?;
        write_atomic(&self.checkpoint_path(), &content)
    }
}

/// A hash is usable as a file name only if it cannot escape the block directory
pub fn is_safe_page_name(hash: &str) -> bool {
    !hash.is_empty() && hash.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Atomic write: write to temp file, then rename
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, data)
        .and_then(|_| std::fs::rename(&temp_path, path))
        .map_err(|e| DaemonError::Filesystem(format!("Failed to write {}: {}", path.display(), e)))?;

    tracing::trace!("Wrote {} ({} bytes)", path.display(), data.len());
    Ok(())
}
