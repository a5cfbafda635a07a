//! Room configuration.

use std::time::Duration;

/// Hard cap on players per room. Configuration may lower it, never raise it.
pub const MAX_PLAYERS: usize = 5;

/// Settings shared by every room a store creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomConfig {
    /// Maximum players allowed in a room, `1..=5`.
    pub max_players: usize,

    /// A room with no accepted command for this long shuts itself down.
    pub idle_ttl: Duration,

    /// Capacity of each room actor's command channel. Callers wait when
    /// it is full.
    pub command_buffer: usize,

    /// Deal a random card at start to every player who has not
    /// uploaded one.
    pub deal_boards_on_start: bool,

    /// Re-check a win claim against the claimant's card and the drawn
    /// numbers instead of trusting the client.
    pub strict_win_claims: bool,

    /// Longest chat message accepted, in characters.
    pub max_message_len: usize,

    /// Chat messages kept in the room snapshot. Older ones are dropped.
    pub message_history: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            idle_ttl: Duration::from_secs(30 * 60),
            command_buffer: 64,
            deal_boards_on_start: true,
            strict_win_claims: false,
            max_message_len: 280,
            message_history: 50,
        }
    }
}

impl RoomConfig {
    /// Clamps out-of-range values into the supported range.
    pub fn validated(mut self) -> Self {
        self.max_players = self.max_players.clamp(1, MAX_PLAYERS);
        self.command_buffer = self.command_buffer.max(1);
        self.max_message_len = self.max_message_len.max(1);
        self.message_history = self.message_history.max(1);
        if self.idle_ttl.is_zero() {
            self.idle_ttl = Self::default().idle_ttl;
        }
        self
    }
}
