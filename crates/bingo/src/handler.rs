//! Per-connection gateway: decode frames, route commands, relay broadcasts.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The loop waits on three things at once:
//!   1. a room broadcast for the bound room → forward as `room_updated`
//!   2. a frame from the client → decode and handle it to completion
//!   3. the idle deadline → close the connection
//!
//! A frame is handled fully (including the room's reply) before the next
//! frame is read, so commands from one connection apply in the order sent.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bingo_protocol::{
    ClientEnvelope, Codec, Command, ErrorCode, Outcome, PlayerId, Reply, RoomCode, ServerEvent,
};
use bingo_room::{Action, Joined, RoomUpdate, Subscriber, SubscriberId, UpdateSender};
use bingo_transport::Connection;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::server::ServerState;
use crate::session::Session;
use crate::{BingoError, GatewayError};

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Splits a fire-and-forget command into its room, the `playerId` it
/// claims to act as (if any), and the room action.
fn room_action(command: Command) -> Option<(RoomCode, Option<PlayerId>, Action)> {
    let routed = match command {
        Command::LeaveRoom { room_id } => (room_id, None, Action::Leave),
        Command::StartGame { room_id } => (room_id, None, Action::Start),
        Command::KickPlayer { room_id, player_id } => {
            (room_id, None, Action::Kick { target: player_id })
        }
        Command::UpdateBoard {
            room_id,
            player_id,
            board,
        } => (room_id, player_id, Action::UpdateBoard { board }),
        Command::SubmitNumber {
            room_id,
            player_id,
            number,
        } => (room_id, player_id, Action::SubmitNumber { number }),
        Command::DrawNumber { room_id } => (room_id, None, Action::DrawNumber),
        Command::MarkCell {
            room_id,
            player_id,
            row,
            col,
        } => (room_id, player_id, Action::MarkCell { row, col }),
        Command::DeclareWin { room_id, player_id } => (room_id, player_id, Action::DeclareWin),
        Command::RestartGame { room_id } => (room_id, None, Action::Restart),
        Command::SendMessage {
            room_id,
            player_id,
            text,
        } => (room_id, player_id, Action::SendMessage { text }),
        Command::CreateRoom { .. }
        | Command::JoinRoom { .. }
        | Command::RejoinRoom { .. }
        | Command::Heartbeat { .. } => return None,
    };
    Some(routed)
}

/// State owned by one connection task.
struct Gateway<'a, T: Connection, C: Codec> {
    conn: &'a T,
    state: &'a ServerState<C>,
    session: Session,
    updates: UpdateSender,
}

impl<T: Connection, C: Codec> Gateway<'_, T, C> {
    async fn send(&self, event: &ServerEvent) -> Result<(), BingoError> {
        let bytes = self.state.codec.encode_event(event)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    fn subscriber(&self) -> Subscriber {
        Subscriber {
            id: self.session.subscriber(),
            updates: self.updates.clone(),
        }
    }

    /// Forwards a broadcast if it belongs to the bound room.
    async fn relay(&mut self, update: RoomUpdate) -> Result<(), BingoError> {
        if self.session.room() != Some(&update.room.id) {
            return Ok(());
        }
        if self.session.observe(&update.room) {
            tracing::info!(conn = %self.conn.id(), room = %update.room.id, "player removed, session unbound");
        }
        self.send(&ServerEvent::RoomUpdated {
            seq: update.seq,
            room: update.room,
        })
        .await
    }

    async fn handle_frame(&mut self, data: &[u8]) -> Result<(), BingoError> {
        let envelope: ClientEnvelope = match self.state.codec.decode_frame(data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(conn = %self.conn.id(), error = %e, "failed to decode frame");
                return self
                    .send(&ServerEvent::Error {
                        code: ErrorCode::BadRequest,
                        message: e.to_string(),
                    })
                    .await;
            }
        };

        let ClientEnvelope { ack, command } = envelope;
        let name = command.name();
        match command {
            Command::Heartbeat { client_time } => {
                self.send(&ServerEvent::HeartbeatAck {
                    client_time,
                    server_time: epoch_millis(),
                })
                .await
            }
            Command::CreateRoom {
                host_name,
                board_size,
            } => {
                let outcome = match self.state.rooms.create_room(&host_name, board_size).await {
                    Ok(room_id) => Outcome::Ok(Reply::Created { room_id }),
                    Err(e) => Outcome::Err(GatewayError::from(e).to_reply()),
                };
                self.acknowledge(ack, outcome).await
            }
            Command::JoinRoom {
                room_id,
                player_name,
            } => {
                let result = self.join(&room_id, player_name).await;
                self.acknowledge_joined(ack, name, result).await
            }
            Command::RejoinRoom { room_id, player_id } => {
                let result = self.rejoin(&room_id, player_id).await;
                self.acknowledge_joined(ack, name, result).await
            }
            other => {
                let Some((room_id, claimed, action)) = room_action(other) else {
                    return Ok(());
                };
                if let Err(e) = self.act(&room_id, claimed.as_ref(), action).await {
                    tracing::debug!(conn = %self.conn.id(), room = %room_id, command = name, error = %e, "command rejected");
                    return self
                        .send(&ServerEvent::Rejected {
                            command: name.to_string(),
                            code: e.code(),
                            message: e.to_string(),
                        })
                        .await;
                }
                Ok(())
            }
        }
    }

    async fn join(&mut self, room_id: &RoomCode, name: String) -> Result<Joined, GatewayError> {
        let handle = self.state.rooms.room(room_id).await?;
        let joined = handle.join(name, self.subscriber()).await?;
        self.session.bind(handle, joined.player.id.clone()).await;
        Ok(joined)
    }

    async fn rejoin(&mut self, room_id: &RoomCode, player_id: PlayerId) -> Result<Joined, GatewayError> {
        let handle = self.state.rooms.room(room_id).await?;
        let joined = handle.rejoin(player_id, self.subscriber()).await?;
        self.session.bind(handle, joined.player.id.clone()).await;
        Ok(joined)
    }

    async fn act(
        &self,
        room_id: &RoomCode,
        claimed: Option<&PlayerId>,
        action: Action,
    ) -> Result<(), GatewayError> {
        let (handle, issuer) = self.session.issuer(room_id, claimed)?;
        handle.act(issuer, action).await?;
        Ok(())
    }

    async fn acknowledge_joined(
        &self,
        ack: Option<u64>,
        command: &str,
        result: Result<Joined, GatewayError>,
    ) -> Result<(), BingoError> {
        let outcome = match result {
            Ok(Joined { room, player }) => {
                tracing::info!(conn = %self.conn.id(), room = %room.id, player = %player.id, command, "session bound");
                Outcome::Ok(Reply::Joined { room, player })
            }
            Err(e) => {
                tracing::debug!(conn = %self.conn.id(), command, error = %e, "join refused");
                Outcome::Err(e.to_reply())
            }
        };
        self.acknowledge(ack, outcome).await
    }

    async fn acknowledge(&self, ack: Option<u64>, outcome: Outcome) -> Result<(), BingoError> {
        self.send(&ServerEvent::Ack {
            ack: ack.unwrap_or_default(),
            outcome,
        })
        .await
    }
}

/// Handles a single connection from accept to close.
///
/// Closing the connection never removes its player from the room; the
/// session's drop only releases the broadcast subscription.
pub(crate) async fn handle_connection<T: Connection, C: Codec>(
    conn: T,
    state: Arc<ServerState<C>>,
) -> Result<(), BingoError> {
    let conn_id = conn.id();
    tracing::info!(conn = %conn_id, peer = %conn.peer_addr(), "client connected");

    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel();
    let mut gateway = Gateway {
        conn: &conn,
        state: &state,
        session: Session::new(SubscriberId::new(conn_id.into_inner())),
        updates: updates_tx,
    };

    let timeout = state.config.client_timeout;
    let mut deadline = Instant::now() + timeout;

    let result = loop {
        tokio::select! {
            Some(update) = updates_rx.recv() => {
                if let Err(e) = gateway.relay(update).await {
                    break Err(e);
                }
            }
            frame = conn.recv() => match frame {
                Ok(Some(data)) => {
                    deadline = Instant::now() + timeout;
                    if let Err(e) = gateway.handle_frame(&data).await {
                        break Err(e);
                    }
                }
                Ok(None) => {
                    tracing::info!(conn = %conn_id, "connection closed cleanly");
                    break Ok(());
                }
                Err(e) => break Err(e.into()),
            },
            () = tokio::time::sleep_until(deadline) => {
                tracing::info!(conn = %conn_id, "connection timed out");
                let _ = conn.close().await;
                break Ok(());
            }
        }
    };

    tracing::info!(
        conn = %conn_id,
        room = ?gateway.session.room(),
        player = ?gateway.session.player(),
        "client disconnected"
    );
    // gateway.session drops here → subscription released.
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_action_routes_player_commands() {
        let code = RoomCode::new("ABCD");
        let (room, claimed, action) = room_action(Command::SubmitNumber {
            room_id: code.clone(),
            player_id: Some(PlayerId::new("p")),
            number: 9,
        })
        .unwrap();
        assert_eq!(room, code);
        assert_eq!(claimed, Some(PlayerId::new("p")));
        assert_eq!(action, Action::SubmitNumber { number: 9 });
    }

    #[test]
    fn test_kick_target_is_not_a_claimed_issuer() {
        let (_, claimed, action) = room_action(Command::KickPlayer {
            room_id: RoomCode::new("ABCD"),
            player_id: PlayerId::new("target"),
        })
        .unwrap();
        assert_eq!(claimed, None);
        assert_eq!(
            action,
            Action::Kick {
                target: PlayerId::new("target")
            }
        );
    }

    #[test]
    fn test_acknowledged_commands_are_not_room_actions() {
        assert!(room_action(Command::Heartbeat { client_time: 1 }).is_none());
        assert!(room_action(Command::CreateRoom {
            host_name: "Ann".into(),
            board_size: 5,
        })
        .is_none());
    }
}
