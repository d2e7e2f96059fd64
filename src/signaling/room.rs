//! `room_joined` snapshot sent by the signaling server
//!
//! Only the share list matters for key recovery; the rest of the room is
//! modelled so a saved snapshot round-trips and so the announced threshold
//! and key can be checked.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SignalingError;
use crate::keying::ShareRecord;

/// Message type carrying the share set.
pub const ROOM_JOINED: &str = "room_joined";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomJoined {
    #[serde(rename = "type")]
    pub kind: String,
    pub room: RoomData,
}

impl RoomJoined {
    pub fn from_json(json: &str) -> Result<Self, SignalingError> {
        let message: Self = serde_json::from_str(json)?;
        message.ensure_kind()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SignalingError> {
        let message: Self = serde_json::from_reader(reader)?;
        message.ensure_kind()
    }

    pub fn to_json(&self) -> Result<String, SignalingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn ensure_kind(self) -> Result<Self, SignalingError> {
        if self.kind != ROOM_JOINED {
            return Err(SignalingError::UnexpectedMessageType(self.kind));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomData {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub users: Vec<RoomUser>,
    /// Creation time as the server wrote it; see [`RoomData::created_at_utc`]
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub max_users: u32,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub messages: Vec<RoomMessage>,
    /// Plain key some server builds still include alongside the shares
    #[serde(default, rename = "sm4Key", skip_serializing_if = "Option::is_none")]
    pub announced_key: Option<String>,
    #[serde(default)]
    pub key_version: u32,
    #[serde(default)]
    pub key_created_at: Option<String>,
    #[serde(default)]
    pub shamir_shares: Vec<ShareRecord>,
    #[serde(default)]
    pub share_count: u32,
    #[serde(default)]
    pub threshold: u32,
    #[serde(default)]
    pub user_count: u32,
}

impl RoomData {
    /// `createdAt` as UTC, when it is RFC 3339.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.created_at.as_deref())
    }

    /// `keyCreatedAt` as UTC, when it is RFC 3339.
    pub fn key_created_at_utc(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.key_created_at.as_deref())
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw?.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUser {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub username: String,
    pub timestamp: String,
    pub id: String,
}
