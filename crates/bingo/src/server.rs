//! `BingoServer` builder and server loop.
//!
//! This is the entry point for running the bingo server. It ties
//! together all the layers: transport → protocol → gateway → room store.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bingo_protocol::{Codec, JsonCodec};
use bingo_room::{RoomConfig, RoomStore};
use bingo_transport::{Pending, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{BingoError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The room
/// store does its own locking.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: RoomStore,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a bingo server.
///
/// # Example
///
/// ```rust,no_run
/// use bingo::prelude::*;
///
/// # async fn run() -> Result<(), BingoError> {
/// let server = BingoServer::builder()
///     .bind("0.0.0.0:3301")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct BingoServerBuilder {
    config: ServerConfig,
}

impl BingoServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a complete configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn room_config(mut self, room: RoomConfig) -> Self {
        self.config.room = room;
        self
    }

    pub fn client_timeout(mut self, timeout: Duration) -> Self {
        self.config.client_timeout = timeout;
        self
    }

    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.config.handshake_timeout = timeout;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Validates the configuration and binds the listener.
    ///
    /// Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build(self) -> Result<BingoServer<JsonCodec>, BingoError> {
        let config = self.config.validated()?;
        let transport = WebSocketTransport::bind(&config.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: RoomStore::new(config.room.clone()),
            codec: JsonCodec,
            config,
        });

        Ok(BingoServer { transport, state })
    }
}

/// A bound bingo server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BingoServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl BingoServer<JsonCodec> {
    pub fn builder() -> BingoServerBuilder {
        BingoServerBuilder::new()
    }
}

impl<C: Codec> BingoServer<C> {
    /// Returns the address the server is bound to. Useful after binding
    /// to port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, BingoError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop. Never returns under normal operation.
    pub async fn run(self) -> Result<(), BingoError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then stops every
    /// room and returns.
    ///
    /// Each peer is upgraded and served on its own task, so a slow
    /// handshake never delays the next accept. One background task
    /// periodically sweeps stopped rooms out of the store.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), BingoError> {
        tracing::info!(addr = %self.local_addr()?, "bingo server running");

        let sweeper = Arc::clone(&self.state);
        let sweep_task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweeper.config.sweep_interval);
            loop {
                ticker.tick().await;
                let removed = sweeper.rooms.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "swept closed rooms");
                }
            }
        });

        tokio::pin!(shutdown);
        loop {
            let accepted = tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => accepted,
            };
            match accepted {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.upgrade(state.config.handshake_timeout).await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }

        tracing::info!("shutting down");
        sweep_task.abort();
        self.state.rooms.shutdown_all().await;
        Ok(())
    }
}
