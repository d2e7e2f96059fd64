//! Share transport decoding
//!
//! The signaling server sends each share as URL-safe base64 (`-` and `_`),
//! usually with the trailing `=` padding stripped. Decoded, a share is the
//! polynomial evaluations for every secret byte followed by one byte holding
//! the share's x-coordinate.

use std::fmt;

use base64::{
    alphabet,
    engine::{general_purpose, GeneralPurpose},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::KeyRecoveryError;

/// Standard alphabet, padded, ignoring non-zero bits after the last byte.
const SHARE_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_allow_trailing_bits(true),
);

/// One `{index, share}` entry of a room snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareRecord {
    /// Index assigned by the server. Informational only: the x-coordinate
    /// used for interpolation is the final byte of the decoded share.
    pub index: u32,
    /// URL-safe base64 share text. `null` on the wire is reported as an
    /// empty share rather than a malformed message.
    #[serde(default)]
    pub share: Option<String>,
}

impl ShareRecord {
    pub fn new(index: u32, share: impl Into<String>) -> Self {
        Self {
            index,
            share: Some(share.into()),
        }
    }
}

/// A decoded share: `L - 1` payload bytes followed by the x-coordinate.
#[derive(Clone)]
pub struct Share {
    index: Option<u32>,
    data: Zeroizing<Vec<u8>>,
}

impl Share {
    /// Wrap already-decoded bytes.
    pub fn from_bytes(index: Option<u32>, data: Vec<u8>) -> Self {
        Self {
            index,
            data: Zeroizing::new(data),
        }
    }

    /// Decode a share string as received from the signaling server.
    pub fn decode(index: Option<u32>, text: &str) -> Result<Self, KeyRecoveryError> {
        let data = decode_share(text)?;
        Ok(Self { index, data })
    }

    pub fn from_record(record: &ShareRecord) -> Result<Self, KeyRecoveryError> {
        match record.share.as_deref() {
            Some(text) => Self::decode(Some(record.index), text),
            None => Err(KeyRecoveryError::EmptyShare { position: 0 }),
        }
    }

    /// Server-assigned index, if the share came from a record.
    pub fn index(&self) -> Option<u32> {
        self.index
    }

    /// Decoded length in bytes, x-coordinate included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The x-coordinate carried in the final byte.
    pub fn x(&self) -> Option<u8> {
        self.data.last().copied()
    }

    /// Evaluation for secret byte `position`.
    pub fn y(&self, position: usize) -> Option<u8> {
        self.payload().get(position).copied()
    }

    /// Evaluation bytes without the trailing x-coordinate.
    pub fn payload(&self) -> &[u8] {
        match self.data.split_last() {
            Some((_, payload)) => payload,
            None => &[],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Share")
            .field("index", &self.index)
            .field("len", &self.len())
            .field("x", &self.x())
            .finish_non_exhaustive()
    }
}

/// Decode URL-safe, possibly unpadded base64 share text into raw bytes.
///
/// Surrounding whitespace is ignored. Errors carry position 0; callers
/// decoding a whole set relabel them with [`KeyRecoveryError::at`].
pub fn decode_share(text: &str) -> Result<Zeroizing<Vec<u8>>, KeyRecoveryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(KeyRecoveryError::EmptyShare { position: 0 });
    }

    let mut normalized = Zeroizing::new(String::with_capacity(trimmed.len() + 3));
    normalized.extend(trimmed.chars().map(|c| match c {
        '-' => '+',
        '_' => '/',
        other => other,
    }));
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }

    SHARE_ENGINE
        .decode(normalized.as_bytes())
        .map(Zeroizing::new)
        .map_err(|e| KeyRecoveryError::InvalidShareEncoding {
            position: 0,
            reason: e.to_string(),
        })
}

impl KeyRecoveryError {
    /// Attribute a per-share error to its position in the input set.
    pub fn at(self, position: usize) -> Self {
        match self {
            KeyRecoveryError::EmptyShare { .. } => KeyRecoveryError::EmptyShare { position },
            KeyRecoveryError::InvalidShareEncoding { reason, .. } => {
                KeyRecoveryError::InvalidShareEncoding { position, reason }
            }
            KeyRecoveryError::ReservedCoordinate { .. } => {
                KeyRecoveryError::ReservedCoordinate { position }
            }
            other => other,
        }
    }
}
