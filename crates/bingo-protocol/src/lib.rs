//! Wire protocol for the bingo server.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Room model** ([`Room`], [`Player`], [`ChatMessage`], [`RoomStatus`]):
//!   the full snapshot broadcast after every mutation.
//! - **Messages** ([`ClientEnvelope`], [`Command`], [`ServerEvent`]):
//!   commands in, acknowledgements and broadcasts out.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how frames become bytes.
//! - **Errors** ([`ProtocolError`], [`ErrorCode`]): malformed frames and
//!   the typed failure codes carried in replies.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEnvelope / ServerEvent) → Room store
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{Codec, MAX_FRAME_BYTES};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientEnvelope, Command, ErrorReply, Outcome, Reply, ServerEvent};
pub use types::{ChatMessage, ErrorCode, Player, PlayerId, Room, RoomCode, RoomStatus};

/// Board types travel inside snapshots, so they are part of the protocol.
pub use bingo_board::{Board, BoardSize, Cell, CellValue};
