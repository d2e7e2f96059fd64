//! Threshold reconstruction of the room key
//!
//! Every byte of the secret is the constant term of its own polynomial, and
//! all polynomials are evaluated at the same x-coordinates. The Lagrange
//! basis at zero therefore only depends on the share set and is computed once
//! for all byte positions.

use std::fmt;

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use super::galois::GF256;
use super::share::{Share, ShareRecord};
use super::KeyRecoveryError;

/// Hex-encoded key recovered from a share set.
#[derive(Clone)]
pub struct ReconstructedKey {
    secret: Zeroizing<Vec<u8>>,
    hex: Zeroizing<String>,
}

impl ReconstructedKey {
    pub fn from_secret(secret: Zeroizing<Vec<u8>>) -> Self {
        let hex = Zeroizing::new(hex::encode(secret.as_slice()));
        Self { secret, hex }
    }

    /// Lowercase hex, two digits per byte, no separators.
    pub fn as_hex(&self) -> &str {
        &self.hex
    }

    /// Raw key material for the frame cipher.
    pub fn as_bytes(&self) -> &[u8] {
        &self.secret
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.secret.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }

    /// First four bytes of SHA-256 over the key, for logs.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.secret.as_slice());
        hex::encode(&digest[..4])
    }
}

impl PartialEq for ReconstructedKey {
    fn eq(&self, other: &Self) -> bool {
        self.secret.as_slice() == other.secret.as_slice()
    }
}

impl Eq for ReconstructedKey {}

impl fmt::Debug for ReconstructedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconstructedKey")
            .field("len", &self.len())
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Recover the raw secret bytes from a share set.
///
/// Shares beyond the original threshold are harmless. Fewer than the
/// threshold still interpolate, to a wrong value; the threshold is not
/// recorded in the shares and cannot be checked here.
pub fn reconstruct_secret(shares: &[Share]) -> Result<Zeroizing<Vec<u8>>, KeyRecoveryError> {
    let first = shares.first().ok_or(KeyRecoveryError::EmptyShareSet)?;
    let share_len = first.len();
    if share_len < 2 {
        return Err(KeyRecoveryError::ShareTooShort { len: share_len });
    }

    let mut xs = Vec::with_capacity(shares.len());
    for (position, share) in shares.iter().enumerate() {
        if share.len() != share_len {
            return Err(KeyRecoveryError::ShareLengthMismatch {
                position,
                expected: share_len,
                actual: share.len(),
            });
        }
        match share.x() {
            Some(0) | None => return Err(KeyRecoveryError::ReservedCoordinate { position }),
            Some(x) => xs.push(x),
        }
    }

    let gf = GF256::global();
    let basis = gf.lagrange_basis_at_zero(&xs)?;

    let mut secret = Zeroizing::new(vec![0u8; share_len - 1]);
    for (position, byte) in secret.iter_mut().enumerate() {
        *byte = shares
            .iter()
            .zip(&basis)
            .fold(0u8, |acc, (share, &li)| {
                gf.add(acc, gf.multiply(share.payload()[position], li))
            });
    }

    Ok(secret)
}

/// Recover the key from decoded shares.
pub fn reconstruct(shares: &[Share]) -> Result<ReconstructedKey, KeyRecoveryError> {
    reconstruct_secret(shares).map(ReconstructedKey::from_secret)
}

/// Decode the records of a room snapshot and recover the key.
pub fn recover_key(records: &[ShareRecord]) -> Result<ReconstructedKey, KeyRecoveryError> {
    if records.is_empty() {
        return Err(KeyRecoveryError::EmptyShareSet);
    }

    let shares = records
        .iter()
        .enumerate()
        .map(|(position, record)| Share::from_record(record).map_err(|e| e.at(position)))
        .collect::<Result<Vec<_>, _>>()?;

    reconstruct(&shares)
}
