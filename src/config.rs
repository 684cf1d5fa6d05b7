use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Capacity bounds of the target machine and the assembler's symbol tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsmConfig {
    pub data_segment_size: usize, // bytes; declarations must stay strictly below
    pub code_segment_size: usize, // instructions
    pub max_data_labels: usize,
    pub max_branch_labels: usize,
}

impl Default for AsmConfig {
    fn default() -> Self {
        Self {
            data_segment_size: 16,
            code_segment_size: 64,
            max_data_labels: 8,
            max_branch_labels: 16,
        }
    }
}

impl AsmConfig {
    /// Reads a JSON config; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        // start addresses and folded addresses are 8-bit fields
        ensure!(
            (1..=256).contains(&self.data_segment_size),
            "data_segment_size must be within 1..=256, got {}",
            self.data_segment_size
        );
        ensure!(self.code_segment_size > 0, "code_segment_size must be non-zero");
        Ok(())
    }
}
