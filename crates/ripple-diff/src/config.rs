use serde::{Deserialize, Serialize};

/// Edit-script algorithm used when diffing two snapshots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffAlgorithm {
    /// Myers' O(ND) algorithm.
    #[default]
    Myers,
    /// Classic longest-common-subsequence table.
    Lcs,
}

/// Configuration for snapshot diffing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Which algorithm produces the edit script.
    pub algorithm: DiffAlgorithm,
    /// Pair deleted and inserted elements that compare equal into moves.
    pub detect_moves: bool,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            algorithm: DiffAlgorithm::Myers,
            detect_moves: true,
        }
    }
}

impl DiffConfig {
    /// Plain insert/delete scripts, no move pairing.
    pub fn without_moves() -> Self {
        Self {
            detect_moves: false,
            ..Default::default()
        }
    }
}
