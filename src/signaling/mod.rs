//! Key recovery driven by signaling snapshots
//!
//! The signaling channel delivers a `room_joined` snapshot containing the
//! share list. `KeyRecovery` runs the keying engine over it and applies the
//! room-level checks a `RecoveryConfig` asks for.

pub mod room;

pub use room::{RoomData, RoomJoined, RoomMessage, RoomUser, ROOM_JOINED};

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::RecoveryConfig;
use crate::keying::{self, KeyRecoveryError, ReconstructedKey, Share};

#[derive(Error, Debug)]
pub enum SignalingError {
    #[error("Malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    #[error("Unexpected message type: {0}")]
    UnexpectedMessageType(String),

    #[error("Room {room_id} carries {provided} shares, threshold is {threshold}")]
    InsufficientShares {
        room_id: String,
        provided: usize,
        threshold: usize,
    },

    #[error("Recovered key is {actual} bytes, expected {expected}")]
    UnexpectedKeyLength { expected: usize, actual: usize },

    #[error("Key recovery failed: {0}")]
    KeyRecovery(#[from] KeyRecoveryError),
}

/// Outcome of recovering a room's media key.
#[derive(Debug, Clone)]
pub struct RecoveredRoomKey {
    pub room_id: String,
    pub key_version: u32,
    pub key: ReconstructedKey,
    pub shares_used: usize,
    /// `Some` when the snapshot also announced the key and comparison is enabled
    pub announced_matches: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct KeyRecovery {
    config: RecoveryConfig,
}

impl KeyRecovery {
    pub fn new(config: RecoveryConfig) -> Self {
        Self { config }
    }

    /// Recover the key for the room described by `message`.
    pub fn recover(&self, message: &RoomJoined) -> Result<RecoveredRoomKey, SignalingError> {
        let room = &message.room;
        let records = &room.shamir_shares;

        debug!(
            "Recovering key for room {} (version {}, key created {:?}) from {} shares, announced {}-of-{}",
            room.id,
            room.key_version,
            room.key_created_at_utc(),
            records.len(),
            room.threshold,
            room.share_count
        );

        self.check_threshold(room)?;

        let shares = records
            .iter()
            .enumerate()
            .map(|(position, record)| Share::from_record(record).map_err(|e| e.at(position)))
            .collect::<Result<Vec<_>, _>>()?;

        for share in &shares {
            debug!(
                "Share index {:?}: {} bytes, x-coordinate {:?}",
                share.index(),
                share.len(),
                share.x()
            );
        }

        let key = keying::reconstruct(&shares)?;

        if let Some(expected) = self.config.expected_key_len {
            if key.len() != expected {
                return Err(SignalingError::UnexpectedKeyLength {
                    expected,
                    actual: key.len(),
                });
            }
        }

        let announced_matches = self.compare_announced(room, &key);

        info!(
            "Recovered {}-byte key {} for room {} (version {})",
            key.len(),
            key.fingerprint(),
            room.id,
            room.key_version
        );

        Ok(RecoveredRoomKey {
            room_id: room.id.clone(),
            key_version: room.key_version,
            key,
            shares_used: shares.len(),
            announced_matches,
        })
    }

    /// Parse a snapshot and recover its key.
    pub fn recover_json(&self, json: &str) -> Result<RecoveredRoomKey, SignalingError> {
        self.recover(&RoomJoined::from_json(json)?)
    }

    fn check_threshold(&self, room: &RoomData) -> Result<(), SignalingError> {
        let provided = room.shamir_shares.len();
        let threshold = room.threshold as usize;
        if provided == 0 || provided >= threshold {
            return Ok(());
        }

        if self.config.enforce_threshold {
            return Err(SignalingError::InsufficientShares {
                room_id: room.id.clone(),
                provided,
                threshold,
            });
        }

        warn!(
            "Room {} carries {} shares but announces threshold {}; the recovered key will be wrong",
            room.id, provided, threshold
        );
        Ok(())
    }

    fn compare_announced(&self, room: &RoomData, key: &ReconstructedKey) -> Option<bool> {
        if !self.config.compare_announced_key {
            return None;
        }

        let announced = room.announced_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;
        let matches = announced.eq_ignore_ascii_case(key.as_hex());
        if !matches {
            warn!(
                "Recovered key {} for room {} differs from the announced key",
                key.fingerprint(),
                room.id
            );
        }
        Some(matches)
    }
}
