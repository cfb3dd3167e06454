//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` (kebab-case) with camelCase
//! fields.

use serde::{Deserialize, Serialize};

/// Inbound frames sent by editor clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Join a room under a display name
    Join {
        room_id: String,
        display_name: String,
    },
    /// Replace the room's document with the sender's full text
    Edit { room_id: String, full_text: String },
    /// Ask the server to send the given text back to the sender
    RequestSync { room_id: String, full_text: String },
}

/// Outbound frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    Joined,
    CodeUpdate,
    MemberLeft,
}

/// One entry of a room roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub connection_id: String,
    pub display_name: String,
}

/// Sent to every member of a room when someone joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedMessage {
    pub r#type: MessageType,
    pub roster: Vec<RosterEntry>,
    pub new_display_name: String,
    pub new_connection_id: String,
}

/// Full document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeUpdateMessage {
    pub r#type: MessageType,
    pub full_text: String,
}

/// Sent to the remaining members when someone leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberLeftMessage {
    pub r#type: MessageType,
    pub connection_id: String,
    pub display_name: String,
}

/// Any outbound frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Joined(JoinedMessage),
    CodeUpdate(CodeUpdateMessage),
    MemberLeft(MemberLeftMessage),
}
