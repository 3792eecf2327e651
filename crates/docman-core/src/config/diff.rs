//! Diff engine limits.

use serde::{Deserialize, Serialize};

/// Limits applied when comparing two versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Largest payload (either side) the engine will load.
    #[serde(default = "default_max_input")]
    pub max_input_bytes: u64,
    /// Largest LCS table (old lines x new lines) computed before the
    /// engine degrades to a single replace hunk.
    #[serde(default = "default_max_cells")]
    pub max_lcs_cells: u64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input(),
            max_lcs_cells: default_max_cells(),
        }
    }
}

fn default_max_input() -> u64 {
    8 * 1024 * 1024
}

fn default_max_cells() -> u64 {
    16_000_000
}
