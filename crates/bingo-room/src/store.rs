//! Room store: creates rooms and finds them by code.
//!
//! The table itself only maps codes to actor handles. Lookups clone the
//! handle and release the lock before talking to the room, so a slow
//! room never holds up another room's traffic.

use std::collections::HashMap;

use bingo_board::BoardSize;
use bingo_protocol::RoomCode;
use rand::seq::IndexedRandom;
use tokio::sync::RwLock;

use crate::room::spawn_room;
use crate::state::RoomState;
use crate::{RoomConfig, RoomError, RoomHandle};

/// Characters a room code is drawn from. Leaves out `I`, `O`, `0`, and
/// `1`, which are easy to misread when a code is read aloud.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

fn random_code() -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..RoomCode::LEN)
        .filter_map(|_| ROOM_CODE_ALPHABET.choose(&mut rng).map(|&b| char::from(b)))
        .collect();
    RoomCode::new(&code)
}

/// All live rooms, keyed by code.
///
/// This is the entry point for room operations from the gateway.
pub struct RoomStore {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
}

impl RoomStore {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            config: config.validated(),
        }
    }

    /// Creates an empty room in WAITING and returns its code.
    ///
    /// The host is whoever joins first; creating a room does not join it.
    pub async fn create_room(&self, host_name: &str, board_size: u8) -> Result<RoomCode, RoomError> {
        let size =
            BoardSize::try_from(board_size).map_err(|_| RoomError::InvalidBoardSize(board_size))?;

        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = random_code();
            match rooms.get(&candidate) {
                Some(handle) if !handle.is_closed() => continue,
                _ => break candidate,
            }
        };

        let state = RoomState::new(code.clone(), host_name, size, self.config.clone())?;
        let handle = spawn_room(state, &self.config);
        rooms.insert(code.clone(), handle);
        tracing::info!(room = %code, %size, "room created");
        Ok(code)
    }

    /// Looks up a live room. Codes are matched case-insensitively.
    pub async fn room(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        let code = RoomCode::new(code.as_str());
        self.rooms
            .read()
            .await
            .get(&code)
            .filter(|handle| !handle.is_closed())
            .cloned()
            .ok_or(RoomError::RoomNotFound(code))
    }

    /// Drops every room whose actor has stopped. Returns how many went.
    pub async fn sweep(&self) -> usize {
        let mut rooms = self.rooms.write().await;
        let before = rooms.len();
        rooms.retain(|code, handle| {
            let live = !handle.is_closed();
            if !live {
                tracing::info!(room = %code, "room removed");
            }
            live
        });
        before - rooms.len()
    }

    /// Number of rooms in the table, including stopped ones not yet swept.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Asks every room to stop.
    pub async fn shutdown_all(&self) {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();
        for handle in handles {
            let _ = handle.shutdown().await;
        }
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_uses_alphabet() {
        for _ in 0..200 {
            let code = random_code();
            assert_eq!(code.as_str().len(), RoomCode::LEN);
            assert!(code.as_str().bytes().all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        }
    }
}
