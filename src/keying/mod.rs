//! Room key recovery from Shamir shares
//!
//! - `galois`: GF(2^8) arithmetic over process-wide log/antilog tables
//! - `share`: transport decoding of the `{index, share}` records
//! - `reconstruct`: Lagrange interpolation at zero and hex encoding
//!
//! Nothing in this module logs, persists or retries. Callers decide what a
//! failed recovery means for the session.

pub mod galois;
pub mod reconstruct;
pub mod share;

pub use galois::{GaloisError, GF256};
pub use reconstruct::{reconstruct, reconstruct_secret, recover_key, ReconstructedKey};
pub use share::{decode_share, Share, ShareRecord};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyRecoveryError {
    #[error("share set is empty")]
    EmptyShareSet,

    #[error("share at position {position} is empty")]
    EmptyShare { position: usize },

    #[error("share at position {position} is not valid base64: {reason}")]
    InvalidShareEncoding { position: usize, reason: String },

    #[error("share is {len} bytes, at least 2 are required")]
    ShareTooShort { len: usize },

    #[error("share at position {position} is {actual} bytes, expected {expected}")]
    ShareLengthMismatch {
        position: usize,
        expected: usize,
        actual: usize,
    },

    #[error("share at position {position} uses the reserved x-coordinate 0")]
    ReservedCoordinate { position: usize },

    #[error("degenerate interpolation: duplicate x-coordinates")]
    DivisionByZero,
}

impl From<GaloisError> for KeyRecoveryError {
    fn from(err: GaloisError) -> Self {
        match err {
            GaloisError::DivisionByZero => KeyRecoveryError::DivisionByZero,
        }
    }
}
