//! Frames exchanged over a connection.
//!
//! Client → server frames are a [`ClientEnvelope`]: an optional `ack`
//! correlation id plus one [`Command`]. Server → client frames are a
//! [`ServerEvent`].
//!
//! ```json
//! {"ack": 1, "command": {"event": "join_room", "data": {"roomId": "K7QP", "playerName": "Ann"}}}
//! {"event": "ack", "ack": 1, "outcome": {"ok": {"room": {...}, "player": {...}}}}
//! {"event": "room_updated", "seq": 4, "room": {...}}
//! ```

use std::sync::Arc;

use bingo_board::Board;
use serde::{Deserialize, Serialize};

use crate::{ErrorCode, Player, PlayerId, Room, RoomCode};

fn default_board_size() -> u8 {
    5
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// One frame from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientEnvelope {
    /// Correlation id echoed back in the [`ServerEvent::Ack`] for
    /// acknowledged commands. Ignored for fire-and-forget commands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    pub command: Command,
}

/// Everything a client can ask of the server.
///
/// `create_room`, `join_room`, and `rejoin_room` are acknowledged: the
/// caller always gets exactly one `ack` reply. The rest are
/// fire-and-forget: success shows up only as the next `room_updated`
/// broadcast, failure as a `rejected` event to the issuing connection.
///
/// `player_id` on the player-scoped commands is optional; when present
/// it must match the player this connection joined as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    CreateRoom {
        host_name: String,
        #[serde(default = "default_board_size")]
        board_size: u8,
    },
    JoinRoom {
        room_id: RoomCode,
        player_name: String,
    },
    RejoinRoom {
        room_id: RoomCode,
        player_id: PlayerId,
    },
    LeaveRoom {
        room_id: RoomCode,
    },
    StartGame {
        room_id: RoomCode,
    },
    KickPlayer {
        room_id: RoomCode,
        player_id: PlayerId,
    },
    UpdateBoard {
        room_id: RoomCode,
        #[serde(default)]
        player_id: Option<PlayerId>,
        board: Board,
    },
    SubmitNumber {
        room_id: RoomCode,
        #[serde(default)]
        player_id: Option<PlayerId>,
        /// Signed so that any integer a client sends reaches the room's
        /// range check.
        number: i64,
    },
    DrawNumber {
        room_id: RoomCode,
    },
    MarkCell {
        room_id: RoomCode,
        #[serde(default)]
        player_id: Option<PlayerId>,
        row: usize,
        col: usize,
    },
    DeclareWin {
        room_id: RoomCode,
        #[serde(default)]
        player_id: Option<PlayerId>,
    },
    RestartGame {
        room_id: RoomCode,
    },
    SendMessage {
        room_id: RoomCode,
        #[serde(default)]
        player_id: Option<PlayerId>,
        text: String,
    },
    Heartbeat {
        client_time: u64,
    },
}

impl Command {
    /// Wire name of the command, as used in `rejected` events and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::RejoinRoom { .. } => "rejoin_room",
            Self::LeaveRoom { .. } => "leave_room",
            Self::StartGame { .. } => "start_game",
            Self::KickPlayer { .. } => "kick_player",
            Self::UpdateBoard { .. } => "update_board",
            Self::SubmitNumber { .. } => "submit_number",
            Self::DrawNumber { .. } => "draw_number",
            Self::MarkCell { .. } => "mark_cell",
            Self::DeclareWin { .. } => "declare_win",
            Self::RestartGame { .. } => "restart_game",
            Self::SendMessage { .. } => "send_message",
            Self::Heartbeat { .. } => "heartbeat",
        }
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A typed failure: machine-readable code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorReply {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Successful result of an acknowledged command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Reply {
    /// `join_room` / `rejoin_room`: the current room and the caller's player.
    Joined { room: Arc<Room>, player: Player },
    /// `create_room`: the new room's code.
    Created { room_id: RoomCode },
}

/// Exactly one of a result or an error, `{"ok": ...}` or `{"err": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok(Reply),
    Err(ErrorReply),
}

/// Every frame the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Reply to an acknowledged command.
    Ack { ack: u64, outcome: Outcome },

    /// Full snapshot after a mutation. `seq` equals `room.version`.
    RoomUpdated { seq: u64, room: Arc<Room> },

    /// A fire-and-forget command failed. Sent only to the issuer.
    Rejected {
        command: String,
        code: ErrorCode,
        message: String,
    },

    HeartbeatAck { client_time: u64, server_time: u64 },

    /// The frame itself could not be understood.
    Error { code: ErrorCode, message: String },
}
