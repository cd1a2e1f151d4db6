//! Configuration for classic-compress

use serde::{Deserialize, Serialize};

use crate::error::CompressError;

/// Bytes per BWT block for each compression level step, as in bzip2.
pub const BWT_BLOCK_UNIT: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionConfig {
    /// 1..=9, selects the BWT block size.
    pub level: u32,
    pub lz77_window: usize,
    pub lz77_lookahead: usize,
    /// Positions advanced between LZ77 dictionary compactions.
    pub lz77_prune_interval: usize,
    pub io_chunk_size: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            level: 9,
            lz77_window: 32768,
            lz77_lookahead: 258,
            lz77_prune_interval: 1000,
            io_chunk_size: 64 * 1024,
        }
    }
}

impl CompressionConfig {
    /// Parse a JSON document, filling absent fields with defaults.
    pub fn from_json(json: &str) -> Result<Self, CompressError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CompressError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, CompressError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CompressError::SerializationError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), CompressError> {
        if !(1..=9).contains(&self.level) {
            return Err(CompressError::InvalidConfig(format!(
                "level {} not in 1..=9",
                self.level
            )));
        }
        if self.lz77_window == 0 || self.lz77_window > u32::MAX as usize {
            return Err(CompressError::InvalidConfig(format!(
                "lz77 window {} not in 1..={}",
                self.lz77_window,
                u32::MAX
            )));
        }
        if self.lz77_lookahead < 3 || self.lz77_lookahead > u16::MAX as usize {
            return Err(CompressError::InvalidConfig(format!(
                "lz77 lookahead {} not in 3..={}",
                self.lz77_lookahead,
                u16::MAX
            )));
        }
        if self.lz77_prune_interval == 0 {
            return Err(CompressError::InvalidConfig("lz77 prune interval must be positive".into()));
        }
        if self.io_chunk_size == 0 {
            return Err(CompressError::InvalidConfig("io chunk size must be positive".into()));
        }
        Ok(())
    }

    pub fn bwt_block_size(&self) -> usize {
        self.level.clamp(1, 9) as usize * BWT_BLOCK_UNIT
    }
}
