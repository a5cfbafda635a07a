//! Turn coordination: whose turn it is and which numbers may be called.
//!
//! A call can enter a room two ways. The player holding the turn may
//! call any uncalled number (`submit_number`, `draw_number`). Any player
//! may mark a cell whose number was already called (`mark_cell`). The
//! first path is turn-gated and lives here; the second is call-gated and
//! never touches the turn.

use bingo_board::{MAX_NUMBER, MIN_NUMBER};
use bingo_protocol::{PlayerId, Room, RoomStatus};
use rand::seq::IndexedRandom;

use crate::RoomError;

pub(crate) fn ensure_playing(room: &Room) -> Result<(), RoomError> {
    match room.status {
        RoomStatus::Playing => Ok(()),
        other => Err(RoomError::GameNotInProgress(other)),
    }
}

/// Succeeds only for the player at `current_turn_index` of a running game.
pub(crate) fn ensure_turn(room: &Room, issuer: &PlayerId) -> Result<(), RoomError> {
    ensure_playing(room)?;
    let index = room
        .player_index(issuer)
        .ok_or_else(|| RoomError::PlayerNotFound(issuer.clone()))?;
    if index != room.current_turn_index {
        return Err(RoomError::NotYourTurn);
    }
    Ok(())
}

/// Checks a called number against the range and the draw history.
pub(crate) fn validate_call(room: &Room, number: i64) -> Result<u8, RoomError> {
    let n = u8::try_from(number)
        .ok()
        .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
        .ok_or(RoomError::NumberOutOfRange(number))?;
    if room.is_drawn(n) {
        return Err(RoomError::NumberAlreadyDrawn(n));
    }
    Ok(n)
}

/// Records an accepted call and passes the turn on.
pub(crate) fn apply_call(room: &mut Room, number: u8) {
    room.drawn_numbers.push(number);
    room.current_turn_index = advance(room.current_turn_index, room.players.len());
}

/// Picks a uniformly random number nobody has called yet.
pub(crate) fn pick_undrawn<R: rand::Rng + ?Sized>(room: &Room, rng: &mut R) -> Result<u8, RoomError> {
    let remaining: Vec<u8> = (MIN_NUMBER..=MAX_NUMBER)
        .filter(|n| !room.is_drawn(*n))
        .collect();
    remaining.choose(rng).copied().ok_or(RoomError::NoNumbersLeft)
}

/// Next turn index, wrapping at the current player count.
pub fn advance(index: usize, player_count: usize) -> usize {
    if player_count == 0 {
        return 0;
    }
    (index + 1) % player_count
}

/// Turn index after the player list shrank to `player_count`.
///
/// The index is only pulled back when it would point past the end.
/// Removing a player who sits before the current index therefore hands
/// the turn to the next player in line; removing the current holder
/// hands it to their successor, or wraps back to the last seat.
pub fn clamp_after_removal(index: usize, player_count: usize) -> usize {
    index.min(player_count.saturating_sub(1))
}
