//! Room store and turn coordination for the bingo server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! players, draw history, and turn index. Commands against a room are
//! applied one at a time; rooms never block each other.
//!
//! # Key types
//!
//! - [`RoomStore`]: creates rooms and looks them up by code
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`Action`]: the player-issued commands a room understands
//! - [`RoomUpdate`]: the snapshot pushed to subscribers after a change
//! - [`RoomConfig`]: player limit, idle timeout, and rule switches

mod config;
mod error;
mod room;
mod state;
mod store;
pub mod turn;

pub use config::{RoomConfig, MAX_PLAYERS};
pub use error::RoomError;
pub use room::{Action, Joined, RoomHandle, RoomUpdate, Subscriber, SubscriberId, UpdateSender};
pub use store::{RoomStore, ROOM_CODE_ALPHABET};
