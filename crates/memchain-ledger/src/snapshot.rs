//! Whole-file JSON chain snapshots.
//!
//! A snapshot is a single JSON array of blocks, rewritten in full on every
//! save. A crash mid-write can leave a truncated file.

use memchain_types::Block;
use std::fs;
use std::path::Path;

use crate::error::LedgerResult;

/// Default snapshot file name inside the data directory
pub const SNAPSHOT_FILE: &str = "chain.json";

/// Write the whole chain to `path`, creating parent directories
pub fn save_snapshot(path: &Path, blocks: &[Block]) -> LedgerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(blocks)?;
    fs::write(path, text)?;
    tracing::info!("Saved chain snapshot ({} blocks) to {:?}", blocks.len(), path);
    Ok(())
}

/// Read a snapshot, or `None` if the file does not exist
pub fn load_snapshot(path: &Path) -> LedgerResult<Option<Vec<Block>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let blocks: Vec<Block> = serde_json::from_str(&text)?;
    tracing::info!("Loaded chain snapshot ({} blocks) from {:?}", blocks.len(), path);
    Ok(Some(blocks))
}
