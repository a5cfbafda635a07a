//! # Bingo
//!
//! Authoritative server for real-time, turn-based multiplayer bingo.
//!
//! Players gather in short-lived rooms identified by a four-character
//! code, take turns calling numbers, mark their cards, and race to
//! complete as many lines as their card is wide. The server owns every
//! room; clients send commands over a WebSocket and render the full room
//! snapshot broadcast after each change.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bingo::prelude::*;
//!
//! # async fn run() -> Result<(), BingoError> {
//! let server = BingoServer::builder()
//!     .bind("127.0.0.1:3301")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;
mod session;

pub use config::{ServerConfig, DEFAULT_BIND_ADDR};
pub use error::{BingoError, GatewayError};
pub use server::{BingoServer, BingoServerBuilder};

pub mod prelude {
    pub use crate::{BingoError, BingoServer, BingoServerBuilder, ServerConfig};
    pub use bingo_board::{BoardSize, Line};
    pub use bingo_protocol::{
        Board, ClientEnvelope, Codec, Command, ErrorCode, JsonCodec, Outcome, Player, PlayerId,
        Reply, Room, RoomCode, RoomStatus, ServerEvent,
    };
    pub use bingo_room::RoomConfig;
}
