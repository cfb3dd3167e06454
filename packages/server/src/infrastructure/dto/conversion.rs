//! Conversion logic between DTOs and domain types.

use crate::domain::{Participant, RoomEvent};
use crate::infrastructure::dto::websocket as dto;

// ========================================
// Domain → DTO
// ========================================

impl From<&Participant> for dto::RosterEntry {
    fn from(participant: &Participant) -> Self {
        Self {
            connection_id: participant.connection_id.as_str().to_string(),
            display_name: participant.display_name.as_str().to_string(),
        }
    }
}

impl From<&RoomEvent> for dto::ServerMessage {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::Joined {
                roster,
                new_participant,
            } => Self::Joined(dto::JoinedMessage {
                r#type: dto::MessageType::Joined,
                roster: roster.iter().map(dto::RosterEntry::from).collect(),
                new_display_name: new_participant.display_name.as_str().to_string(),
                new_connection_id: new_participant.connection_id.as_str().to_string(),
            }),
            RoomEvent::CodeUpdate { full_text } => Self::CodeUpdate(dto::CodeUpdateMessage {
                r#type: dto::MessageType::CodeUpdate,
                full_text: full_text.clone(),
            }),
            RoomEvent::MemberLeft {
                connection_id,
                display_name,
            } => Self::MemberLeft(dto::MemberLeftMessage {
                r#type: dto::MessageType::MemberLeft,
                connection_id: connection_id.as_str().to_string(),
                display_name: display_name.as_str().to_string(),
            }),
        }
    }
}

/// Serialize a domain event into a WebSocket text frame.
pub fn encode_room_event(event: &RoomEvent) -> Result<String, serde_json::Error> {
    serde_json::to_string(&dto::ServerMessage::from(event))
}
