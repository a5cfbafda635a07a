//! Server configuration.

use std::time::Duration;

use bingo_room::RoomConfig;

use crate::BingoError;

/// Default listen address. Port 3301 is what browser clients dial.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3301";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// A connection that sends nothing for this long is closed. Its
    /// player stays in the room and can rejoin.
    pub client_timeout: Duration,
    /// How long a new TCP peer gets to complete the WebSocket upgrade.
    pub handshake_timeout: Duration,
    /// How often stopped rooms are swept out of the store.
    pub sweep_interval: Duration,
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            client_timeout: Duration::from_secs(60),
            handshake_timeout: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(60),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Rejects settings that cannot work and clamps the rest.
    pub fn validated(mut self) -> Result<Self, BingoError> {
        if self.bind_addr.trim().is_empty() {
            return Err(BingoError::Config("bind address is empty".into()));
        }
        if self.client_timeout.is_zero() {
            return Err(BingoError::Config("client timeout must be positive".into()));
        }
        if self.handshake_timeout.is_zero() {
            return Err(BingoError::Config("handshake timeout must be positive".into()));
        }
        if self.sweep_interval.is_zero() {
            return Err(BingoError::Config("sweep interval must be positive".into()));
        }
        self.room = self.room.validated();
        Ok(self)
    }
}
