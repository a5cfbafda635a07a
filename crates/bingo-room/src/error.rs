//! Error types for the room layer.

use bingo_board::BoardError;
use bingo_protocol::{ErrorCode, PlayerId, RoomCode, RoomStatus};

/// Why a room refused a command.
///
/// Every variant maps to one wire [`ErrorCode`]; a refused command never
/// changes the room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No such room, or the room has shut down.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    #[error("game already started")]
    GameAlreadyStarted,

    #[error("room is full")]
    RoomFull,

    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("only the host can do that")]
    NotHost,

    #[error("not your turn")]
    NotYourTurn,

    #[error("number {0} is outside 1..=75")]
    NumberOutOfRange(i64),

    #[error("number {0} has already been called")]
    NumberAlreadyDrawn(u8),

    #[error("win claim does not hold")]
    InvalidWinClaim,

    #[error("no game in progress (room is {0})")]
    GameNotInProgress(RoomStatus),

    #[error("game has not finished")]
    GameNotFinished,

    #[error("every number has been called")]
    NoNumbersLeft,

    #[error("room has no players")]
    NoPlayers,

    #[error("the host cannot kick themselves")]
    CannotKickSelf,

    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),

    #[error("board size {0} is not supported")]
    InvalidBoardSize(u8),

    #[error("no cell at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize },

    #[error("{0} has not been called")]
    CellNotCalled(u8),

    #[error("name must not be empty")]
    InvalidName,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("message is longer than {limit} characters")]
    MessageTooLong { limit: usize },
}

impl RoomError {
    /// The wire code clients switch on.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomNotFound(_) => ErrorCode::RoomNotFound,
            Self::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
            Self::RoomFull => ErrorCode::RoomFull,
            Self::PlayerNotFound(_) => ErrorCode::PlayerNotFound,
            Self::NotHost => ErrorCode::NotHost,
            Self::NotYourTurn => ErrorCode::NotYourTurn,
            Self::NumberOutOfRange(_) => ErrorCode::NumberOutOfRange,
            Self::NumberAlreadyDrawn(_) => ErrorCode::NumberAlreadyDrawn,
            Self::InvalidWinClaim => ErrorCode::InvalidWinClaim,
            Self::GameNotInProgress(_) => ErrorCode::GameNotInProgress,
            Self::GameNotFinished => ErrorCode::GameNotFinished,
            Self::NoNumbersLeft => ErrorCode::NoNumbersLeft,
            Self::NoPlayers => ErrorCode::NoPlayers,
            Self::CannotKickSelf => ErrorCode::CannotKickSelf,
            Self::InvalidBoard(_) => ErrorCode::InvalidBoard,
            Self::InvalidBoardSize(_) => ErrorCode::InvalidBoardSize,
            Self::InvalidCell { .. } => ErrorCode::InvalidCell,
            Self::CellNotCalled(_) => ErrorCode::CellNotCalled,
            Self::InvalidName => ErrorCode::InvalidName,
            Self::EmptyMessage => ErrorCode::EmptyMessage,
            Self::MessageTooLong { .. } => ErrorCode::MessageTooLong,
        }
    }
}
