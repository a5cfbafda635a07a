//! The room model as it travels on the wire.
//!
//! Every mutation of a room produces a fresh [`Room`] value that is sent
//! whole to each subscribed connection. Field names are camelCase in JSON
//! because browser clients consume these snapshots directly.

use std::fmt;

use bingo_board::{Board, BoardSize};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-issued opaque player identifier.
///
/// Distinct from the display name (names may repeat). Clients keep it to
/// rejoin the same logical player after a dropped connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Four-character room code, e.g. `K7QP`.
///
/// Doubles as the subscription routing key and the join code players
/// share with each other. Input is case-insensitive: construction (and
/// deserialization) trims and upper-cases, so `" k7qp"` and `"K7QP"` name
/// the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Length of every generated code.
    pub const LEN: usize = 4;

    pub fn new(code: &str) -> Self {
        Self(code.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self::new(&code)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// Lifecycle of a room.
///
/// ```text
/// WAITING ──start──→ PLAYING ──win──→ WON ──restart──→ WAITING
/// ```
///
/// There is no terminal state: a finished game can always be restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    #[default]
    Waiting,
    Playing,
    Won,
}

impl RoomStatus {
    /// Only waiting rooms accept new players.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// The single state this one may move to.
    pub fn next(self) -> Self {
        match self {
            Self::Waiting => Self::Playing,
            Self::Playing => Self::Won,
            Self::Won => Self::Waiting,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == target
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "WAITING"),
            Self::Playing => write!(f, "PLAYING"),
            Self::Won => write!(f, "WON"),
        }
    }
}

// ---------------------------------------------------------------------------
// Room, Player, ChatMessage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Empty until a card is dealt or uploaded.
    #[serde(default)]
    pub board: Board,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: String,
    pub text: String,
}

/// One game session: who is in it, what has been called, and whose turn it is.
///
/// Invariants upheld by the room store:
/// - `drawn_numbers` never holds a duplicate
/// - while `status` is PLAYING, `current_turn_index < players.len()`
/// - `winner` is set exactly when `status` is WON
/// - `players.len()` never exceeds 5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomCode,
    /// The player allowed to start, restart, and kick. `None` until
    /// somebody joins.
    pub host_id: Option<PlayerId>,
    /// Display name of the host, kept in step with `host_id`.
    pub host_name: String,
    pub status: RoomStatus,
    pub board_size: BoardSize,
    /// Join order, which is also turn order.
    pub players: Vec<Player>,
    pub drawn_numbers: Vec<u8>,
    pub current_turn_index: usize,
    pub winner: Option<String>,
    pub messages: Vec<ChatMessage>,
    /// Epoch milliseconds of the last accepted mutation; never decreases.
    pub last_updated: u64,
    /// Incremented by one on every accepted mutation. Broadcasts carry it
    /// as `seq` so clients can drop out-of-order snapshots.
    pub version: u64,
}

impl Room {
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// The player whose turn it is, if a game is running.
    pub fn current_player(&self) -> Option<&Player> {
        match self.status {
            RoomStatus::Playing => self.players.get(self.current_turn_index),
            _ => None,
        }
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        self.host_id.as_ref() == Some(id)
    }

    pub fn is_drawn(&self, number: u8) -> bool {
        self.drawn_numbers.contains(&number)
    }
}

// ---------------------------------------------------------------------------
// ErrorCode
// ---------------------------------------------------------------------------

/// Typed failure carried back to the connection that issued a command.
///
/// Every code is a local validation failure; none is transient, so
/// retrying without fixing the cause fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    RoomNotFound,
    GameAlreadyStarted,
    RoomFull,
    PlayerNotFound,
    NotHost,
    NotYourTurn,
    NumberOutOfRange,
    NumberAlreadyDrawn,
    InvalidWinClaim,
    GameNotInProgress,
    GameNotFinished,
    NoNumbersLeft,
    NoPlayers,
    CannotKickSelf,
    InvalidBoard,
    InvalidBoardSize,
    InvalidCell,
    CellNotCalled,
    InvalidName,
    EmptyMessage,
    MessageTooLong,
    /// The connection has not joined the room it is addressing.
    NotJoined,
    /// The command names a different player than the one this
    /// connection joined as.
    PlayerMismatch,
    /// The frame could not be decoded.
    BadRequest,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room() -> Room {
        Room {
            id: RoomCode::new("ABCD"),
            host_id: Some(PlayerId::new("p1")),
            host_name: "Ann".into(),
            status: RoomStatus::Playing,
            board_size: BoardSize::Five,
            players: vec![
                Player {
                    id: PlayerId::new("p1"),
                    name: "Ann".into(),
                    board: Board::empty(),
                },
                Player {
                    id: PlayerId::new("p2"),
                    name: "Bea".into(),
                    board: Board::empty(),
                },
            ],
            drawn_numbers: vec![7],
            current_turn_index: 1,
            winner: None,
            messages: vec![],
            last_updated: 1_700_000_000_000,
            version: 3,
        }
    }

    #[test]
    fn test_room_code_is_normalized() {
        assert_eq!(RoomCode::new(" k7qp ").as_str(), "K7QP");
        let code: RoomCode = serde_json::from_str("\"ab2c\"").unwrap();
        assert_eq!(code, RoomCode::new("AB2C"));
    }

    #[test]
    fn test_player_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }

    #[test]
    fn test_room_status_cycle() {
        assert_eq!(RoomStatus::Waiting.next(), RoomStatus::Playing);
        assert_eq!(RoomStatus::Playing.next(), RoomStatus::Won);
        assert_eq!(RoomStatus::Won.next(), RoomStatus::Waiting);
        assert!(RoomStatus::Won.can_transition_to(RoomStatus::Waiting));
        assert!(!RoomStatus::Waiting.can_transition_to(RoomStatus::Won));
        assert!(RoomStatus::Waiting.is_joinable());
        assert!(!RoomStatus::Playing.is_joinable());
    }

    #[test]
    fn test_room_status_wire_names() {
        assert_eq!(serde_json::to_string(&RoomStatus::Waiting).unwrap(), "\"WAITING\"");
        assert_eq!(serde_json::to_string(&RoomStatus::Won).unwrap(), "\"WON\"");
    }

    #[test]
    fn test_room_json_uses_camel_case() {
        let json = serde_json::to_value(sample_room()).unwrap();
        assert_eq!(json["id"], "ABCD");
        assert_eq!(json["hostName"], "Ann");
        assert_eq!(json["hostId"], "p1");
        assert_eq!(json["boardSize"], 5);
        assert_eq!(json["status"], "PLAYING");
        assert_eq!(json["drawnNumbers"], serde_json::json!([7]));
        assert_eq!(json["currentTurnIndex"], 1);
        assert!(json["winner"].is_null());
        assert_eq!(json["players"][1]["board"], serde_json::json!([]));
    }

    #[test]
    fn test_room_lookups() {
        let room = sample_room();
        assert_eq!(room.current_player().unwrap().name, "Bea");
        assert_eq!(room.player_index(&PlayerId::new("p2")), Some(1));
        assert!(room.is_host(&PlayerId::new("p1")));
        assert!(!room.is_host(&PlayerId::new("p2")));
        assert!(room.is_drawn(7));
        assert!(!room.is_drawn(8));
    }

    #[test]
    fn test_current_player_none_when_not_playing() {
        let mut room = sample_room();
        room.status = RoomStatus::Waiting;
        assert!(room.current_player().is_none());
    }

    #[test]
    fn test_error_code_wire_name() {
        let json = serde_json::to_string(&ErrorCode::NumberAlreadyDrawn).unwrap();
        assert_eq!(json, "\"NumberAlreadyDrawn\"");
        assert_eq!(ErrorCode::NotYourTurn.to_string(), "NotYourTurn");
    }
}
