// roomkey - media key recovery for group calls
//
// The signaling server splits each room's media key with Shamir secret
// sharing over GF(2^8) and hands the share set to every participant. This
// crate turns that share set back into the hex key the frame cipher uses.

pub mod config;
pub mod keying;
pub mod signaling;

pub use config::RecoveryConfig;
pub use keying::{recover_key, KeyRecoveryError, ReconstructedKey, Share, ShareRecord};
pub use signaling::{KeyRecovery, RecoveredRoomKey, RoomJoined, SignalingError};
