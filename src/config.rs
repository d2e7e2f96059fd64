//! Configuration for room key recovery

use serde::{Deserialize, Serialize};

/// Length of an SM4-128 key, the cipher the recovered key feeds.
pub const SM4_KEY_LEN: usize = 16;

/// Checks applied when recovering a key from a room snapshot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Reject keys of any other length. `None` accepts every length.
    pub expected_key_len: Option<usize>,

    /// Fail instead of warning when the room carries fewer shares than its
    /// announced threshold
    pub enforce_threshold: bool,

    /// Compare the recovered key with the room's announced key, if present
    pub compare_announced_key: bool,
}

impl RecoveryConfig {
    /// Accept keys of any length.
    pub fn any_length() -> Self {
        Self {
            expected_key_len: None,
            ..Self::default()
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            expected_key_len: Some(SM4_KEY_LEN),
            enforce_threshold: false,
            compare_announced_key: true,
        }
    }
}
