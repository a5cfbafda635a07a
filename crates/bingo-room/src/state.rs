//! The authoritative state of one room and every rule that changes it.
//!
//! `RoomState` is plain synchronous data. It is owned by exactly one room
//! actor, which applies commands to it one at a time; nothing else can
//! reach it, so no method here has to think about concurrency. A method
//! that returns `Err` leaves the room untouched.

use std::time::{SystemTime, UNIX_EPOCH};

use bingo_board::{generate_board, is_winner, Board, BoardSize, CellValue};
use bingo_protocol::{ChatMessage, Player, PlayerId, Room, RoomCode, RoomStatus};
use rand::Rng;

use crate::{turn, RoomConfig, RoomError};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// 128 random bits as 32 lowercase hex characters.
pub(crate) fn new_player_id() -> PlayerId {
    PlayerId::new(format!("{:032x}", rand::rng().random::<u128>()))
}

fn clean_name(name: &str) -> Result<String, RoomError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RoomError::InvalidName);
    }
    Ok(name.to_string())
}

pub(crate) struct RoomState {
    room: Room,
    config: RoomConfig,
    next_message_id: u64,
}

impl RoomState {
    pub(crate) fn new(
        code: RoomCode,
        host_name: &str,
        board_size: BoardSize,
        config: RoomConfig,
    ) -> Result<Self, RoomError> {
        let room = Room {
            id: code,
            host_id: None,
            host_name: clean_name(host_name)?,
            status: RoomStatus::Waiting,
            board_size,
            players: Vec::new(),
            drawn_numbers: Vec::new(),
            current_turn_index: 0,
            winner: None,
            messages: Vec::new(),
            last_updated: now_millis(),
            version: 0,
        };
        Ok(Self {
            room,
            config,
            next_message_id: 1,
        })
    }

    pub(crate) fn room(&self) -> &Room {
        &self.room
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.room.players.is_empty()
    }

    /// Marks an accepted mutation.
    fn touch(&mut self) {
        self.room.version += 1;
        self.room.last_updated = now_millis().max(self.room.last_updated);
    }

    fn member(&self, id: &PlayerId) -> Result<usize, RoomError> {
        self.room
            .player_index(id)
            .ok_or_else(|| RoomError::PlayerNotFound(id.clone()))
    }

    fn ensure_host(&self, issuer: &PlayerId) -> Result<(), RoomError> {
        self.member(issuer)?;
        if !self.room.is_host(issuer) {
            return Err(RoomError::NotHost);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds a new player. The first player in becomes host.
    pub(crate) fn join(&mut self, name: &str) -> Result<Player, RoomError> {
        let name = clean_name(name)?;
        if !self.room.status.is_joinable() {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.room.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull);
        }

        let player = Player {
            id: new_player_id(),
            name,
            board: Board::empty(),
        };
        if self.room.host_id.is_none() {
            self.room.host_id = Some(player.id.clone());
            self.room.host_name = player.name.clone();
        }
        self.room.players.push(player.clone());
        self.touch();
        Ok(player)
    }

    /// Looks up an existing player. Never changes the room.
    pub(crate) fn rejoin(&self, id: &PlayerId) -> Result<Player, RoomError> {
        self.room
            .player(id)
            .cloned()
            .ok_or_else(|| RoomError::PlayerNotFound(id.clone()))
    }

    pub(crate) fn kick(&mut self, issuer: &PlayerId, target: &PlayerId) -> Result<Player, RoomError> {
        self.ensure_host(issuer)?;
        if issuer == target {
            return Err(RoomError::CannotKickSelf);
        }
        let index = self.member(target)?;
        Ok(self.remove_at(index))
    }

    pub(crate) fn leave(&mut self, issuer: &PlayerId) -> Result<Player, RoomError> {
        let index = self.member(issuer)?;
        Ok(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> Player {
        let removed = self.room.players.remove(index);
        self.room.current_turn_index =
            turn::clamp_after_removal(self.room.current_turn_index, self.room.players.len());

        if self.room.is_host(&removed.id) {
            self.room.host_id = self.room.players.first().map(|p| p.id.clone());
            if let Some(next) = self.room.players.first() {
                self.room.host_name = next.name.clone();
            }
        }
        self.touch();
        removed
    }

    // -----------------------------------------------------------------------
    // Game flow
    // -----------------------------------------------------------------------

    pub(crate) fn start(&mut self, issuer: &PlayerId) -> Result<(), RoomError> {
        self.ensure_host(issuer)?;
        if !self.room.status.can_transition_to(RoomStatus::Playing) {
            return Err(RoomError::GameAlreadyStarted);
        }
        if self.room.players.is_empty() {
            return Err(RoomError::NoPlayers);
        }

        if self.config.deal_boards_on_start {
            let size = self.room.board_size;
            for player in self.room.players.iter_mut().filter(|p| p.board.is_empty()) {
                player.board = generate_board(size);
            }
        }
        self.room.status = RoomStatus::Playing;
        self.room.current_turn_index = 0;
        self.room.drawn_numbers.clear();
        self.room.winner = None;
        self.touch();
        Ok(())
    }

    /// Replaces the issuer's card wholesale.
    pub(crate) fn update_board(&mut self, issuer: &PlayerId, board: Board) -> Result<(), RoomError> {
        board.validate(self.room.board_size)?;
        let player = self
            .room
            .player_mut(issuer)
            .ok_or_else(|| RoomError::PlayerNotFound(issuer.clone()))?;
        player.board = board;
        self.touch();
        Ok(())
    }

    pub(crate) fn submit_number(&mut self, issuer: &PlayerId, number: i64) -> Result<u8, RoomError> {
        turn::ensure_turn(&self.room, issuer)?;
        let n = turn::validate_call(&self.room, number)?;
        turn::apply_call(&mut self.room, n);
        self.touch();
        Ok(n)
    }

    /// Calls a random uncalled number on the issuer's turn.
    pub(crate) fn draw_number(&mut self, issuer: &PlayerId) -> Result<u8, RoomError> {
        turn::ensure_turn(&self.room, issuer)?;
        let n = turn::pick_undrawn(&self.room, &mut rand::rng())?;
        turn::apply_call(&mut self.room, n);
        self.touch();
        Ok(n)
    }

    /// Toggles one of the issuer's cells. Only numbers already called
    /// can be marked; the FREE square never changes.
    pub(crate) fn mark_cell(
        &mut self,
        issuer: &PlayerId,
        row: usize,
        col: usize,
    ) -> Result<bool, RoomError> {
        turn::ensure_playing(&self.room)?;
        let index = self.member(issuer)?;
        let value = self.room.players[index]
            .board
            .cell(row, col)
            .map(|cell| cell.value)
            .ok_or(RoomError::InvalidCell { row, col })?;
        match value {
            CellValue::Free => return Err(RoomError::InvalidCell { row, col }),
            CellValue::Number(n) if !self.room.is_drawn(n) => {
                return Err(RoomError::CellNotCalled(n));
            }
            CellValue::Number(_) => {}
        }

        let marked = self.room.players[index]
            .board
            .toggle(row, col)
            .ok_or(RoomError::InvalidCell { row, col })?;
        self.touch();
        Ok(marked)
    }

    /// Ends the game in the issuer's favour if their card holds enough lines.
    pub(crate) fn declare_win(&mut self, issuer: &PlayerId) -> Result<(), RoomError> {
        turn::ensure_playing(&self.room)?;
        let index = self.member(issuer)?;
        let player = &self.room.players[index];

        if !is_winner(&player.board) {
            return Err(RoomError::InvalidWinClaim);
        }
        if self.config.strict_win_claims {
            let honest = player
                .board
                .cells()
                .filter(|cell| cell.marked)
                .filter_map(|cell| cell.value.number())
                .all(|n| self.room.is_drawn(n));
            if !honest {
                return Err(RoomError::InvalidWinClaim);
            }
        }

        self.room.winner = Some(player.name.clone());
        self.room.status = RoomStatus::Won;
        self.touch();
        Ok(())
    }

    /// Back to WAITING with a clean slate. Players, host and chat stay.
    pub(crate) fn restart(&mut self, issuer: &PlayerId) -> Result<(), RoomError> {
        self.ensure_host(issuer)?;
        if !self.room.status.can_transition_to(RoomStatus::Waiting) {
            return Err(RoomError::GameNotFinished);
        }
        self.room.status = RoomStatus::Waiting;
        self.room.drawn_numbers.clear();
        self.room.winner = None;
        self.room.current_turn_index = 0;
        for player in &mut self.room.players {
            player.board = Board::empty();
        }
        self.touch();
        Ok(())
    }

    pub(crate) fn send_message(&mut self, issuer: &PlayerId, text: &str) -> Result<(), RoomError> {
        let index = self.member(issuer)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(RoomError::EmptyMessage);
        }
        let limit = self.config.max_message_len;
        if text.chars().count() > limit {
            return Err(RoomError::MessageTooLong { limit });
        }
        let message = ChatMessage {
            id: self.next_message_id,
            sender: self.room.players[index].name.clone(),
            text: text.to_string(),
        };
        self.next_message_id += 1;
        self.room.messages.push(message);

        // Oldest messages fall off; ids keep counting up.
        let excess = self
            .room
            .messages
            .len()
            .saturating_sub(self.config.message_history);
        self.room.messages.drain(..excess);
        self.touch();
        Ok(())
    }
}
