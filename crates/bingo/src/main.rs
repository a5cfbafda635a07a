//! `bingo-server`: runs the bingo WebSocket server.

use std::time::Duration;

use bingo::prelude::*;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Authoritative multiplayer bingo server
#[derive(Parser, Debug)]
#[command(name = "bingo-server")]
#[command(about = "Authoritative multiplayer bingo server", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "BINGO_BIND", default_value = bingo::DEFAULT_BIND_ADDR)]
    bind: String,

    /// Close connections silent for this many seconds
    #[arg(long, env = "BINGO_CLIENT_TIMEOUT_SECS", default_value_t = 60)]
    client_timeout_secs: u64,

    /// Drop peers that have not finished the WebSocket upgrade after this many seconds
    #[arg(long, env = "BINGO_HANDSHAKE_TIMEOUT_SECS", default_value_t = 10)]
    handshake_timeout_secs: u64,

    /// Close rooms with no accepted command for this many seconds
    #[arg(long, env = "BINGO_IDLE_TTL_SECS", default_value_t = 30 * 60)]
    idle_ttl_secs: u64,

    /// Seconds between sweeps of closed rooms
    #[arg(long, env = "BINGO_SWEEP_INTERVAL_SECS", default_value_t = 60)]
    sweep_interval_secs: u64,

    /// Players allowed per room (1-5)
    #[arg(long, env = "BINGO_MAX_PLAYERS", default_value_t = 5)]
    max_players: usize,

    /// Longest chat message accepted, in characters
    #[arg(long, env = "BINGO_MAX_MESSAGE_LEN", default_value_t = 280)]
    max_message_len: usize,

    /// Chat messages kept per room
    #[arg(long, env = "BINGO_MESSAGE_HISTORY", default_value_t = 50)]
    message_history: usize,

    /// Do not deal cards at game start; clients upload their own
    #[arg(long, env = "BINGO_NO_DEAL")]
    no_deal: bool,

    /// Re-check win claims against the numbers actually called
    #[arg(long, env = "BINGO_STRICT_WIN_CLAIMS")]
    strict_win_claims: bool,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            client_timeout: Duration::from_secs(self.client_timeout_secs),
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            room: RoomConfig {
                max_players: self.max_players,
                idle_ttl: Duration::from_secs(self.idle_ttl_secs),
                deal_boards_on_start: !self.no_deal,
                strict_win_claims: self.strict_win_claims,
                max_message_len: self.max_message_len,
                message_history: self.message_history,
                ..RoomConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BingoError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();
    tracing::info!(bind = %config.bind_addr, "starting bingo server");

    let server = BingoServer::builder().config(config).build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "cannot listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_onto_config() {
        let config = Cli::parse_from([
            "bingo-server",
            "--bind",
            "127.0.0.1:9000",
            "--max-players",
            "3",
            "--idle-ttl-secs",
            "90",
            "--no-deal",
        ])
        .into_config();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.room.max_players, 3);
        assert_eq!(config.room.idle_ttl, Duration::from_secs(90));
        assert_eq!(config.handshake_timeout, Duration::from_secs(10));
        assert!(!config.room.deal_boards_on_start);
        assert!(!config.room.strict_win_claims);
    }
}
