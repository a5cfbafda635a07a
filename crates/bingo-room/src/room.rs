//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task and is reached only through an mpsc
//! channel, so commands against one room are applied strictly one after
//! another while different rooms never wait on each other. This is the
//! "actor model": no shared mutable state, just message passing.
//!
//! After every accepted mutation the actor pushes a [`RoomUpdate`] to
//! each subscribed connection, in the order the mutations were applied.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bingo_protocol::{Board, Player, PlayerId, Room, RoomCode};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::state::RoomState;
use crate::{RoomConfig, RoomError};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A snapshot pushed to subscribers after a mutation.
#[derive(Debug, Clone)]
pub struct RoomUpdate {
    /// Equals `room.version`; strictly increasing per room.
    pub seq: u64,
    pub room: Arc<Room>,
}

/// Channel a connection hands to a room to receive [`RoomUpdate`]s.
pub type UpdateSender = mpsc::UnboundedSender<RoomUpdate>;

/// Identifies one subscribed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A connection asking to receive a room's broadcasts.
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub updates: UpdateSender,
}

/// Reply to a successful join or rejoin.
#[derive(Debug, Clone)]
pub struct Joined {
    pub room: Arc<Room>,
    pub player: Player,
}

/// A player-issued command. The issuer travels alongside it in
/// [`RoomHandle::act`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    Kick { target: PlayerId },
    Leave,
    UpdateBoard { board: Board },
    SubmitNumber { number: i64 },
    DrawNumber,
    MarkCell { row: usize, col: usize },
    DeclareWin,
    Restart,
    SendMessage { text: String },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Kick { .. } => "kick",
            Self::Leave => "leave",
            Self::UpdateBoard { .. } => "update_board",
            Self::SubmitNumber { .. } => "submit_number",
            Self::DrawNumber => "draw_number",
            Self::MarkCell { .. } => "mark_cell",
            Self::DeclareWin => "declare_win",
            Self::Restart => "restart",
            Self::SendMessage { .. } => "send_message",
        }
    }
}

// ---------------------------------------------------------------------------
// Commands and handle
// ---------------------------------------------------------------------------

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in a variant is the reply channel: the caller
/// sends the command and waits for the answer on it.
pub(crate) enum RoomCommand {
    Join {
        name: String,
        subscriber: Subscriber,
        reply: oneshot::Sender<Result<Joined, RoomError>>,
    },
    Rejoin {
        player_id: PlayerId,
        subscriber: Subscriber,
        reply: oneshot::Sender<Result<Joined, RoomError>>,
    },
    Act {
        issuer: PlayerId,
        action: Action,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Unsubscribe {
        id: SubscriberId,
    },
    Snapshot {
        reply: oneshot::Sender<Arc<Room>>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone: it is just the room code and an `mpsc::Sender`. Once
/// the actor has stopped every call fails with
/// [`RoomError::RoomNotFound`].
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl fmt::Debug for RoomHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomHandle")
            .field("code", &self.code)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn gone(&self) -> RoomError {
        RoomError::RoomNotFound(self.code.clone())
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| self.gone())?;
        reply_rx.await.map_err(|_| self.gone())
    }

    /// Adds a new player and subscribes the connection.
    pub async fn join(&self, name: impl Into<String>, subscriber: Subscriber) -> Result<Joined, RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            name,
            subscriber,
            reply,
        })
        .await?
    }

    /// Re-attaches a connection to an existing player. Changes nothing in
    /// the room, so nobody else is notified.
    pub async fn rejoin(&self, player_id: PlayerId, subscriber: Subscriber) -> Result<Joined, RoomError> {
        self.request(|reply| RoomCommand::Rejoin {
            player_id,
            subscriber,
            reply,
        })
        .await?
    }

    /// Applies a player command. Resolves once the room has applied (and
    /// broadcast) it or refused it.
    pub async fn act(&self, issuer: PlayerId, action: Action) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Act {
            issuer,
            action,
            reply,
        })
        .await?
    }

    /// Stops broadcasting to a connection. Fire-and-forget.
    pub async fn unsubscribe(&self, id: SubscriberId) {
        let _ = self.sender.send(RoomCommand::Unsubscribe { id }).await;
    }

    pub async fn snapshot(&self) -> Result<Arc<Room>, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.gone())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct Subscription {
    player: PlayerId,
    updates: UpdateSender,
}

/// The internal actor state. Runs inside a Tokio task.
struct RoomActor {
    state: RoomState,
    /// Cached `Arc` of the current room, rebuilt after each mutation so
    /// broadcasts and rejoins share one allocation.
    snapshot: Arc<Room>,
    subscribers: HashMap<SubscriberId, Subscription>,
    idle_ttl: std::time::Duration,
    idle_deadline: Instant,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    fn code(&self) -> &RoomCode {
        &self.snapshot.id
    }

    /// Runs the actor loop until shutdown, idle expiry, or the last
    /// player leaving.
    async fn run(mut self) {
        tracing::info!(room = %self.code(), "room actor started");

        loop {
            let cmd = tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
                () = tokio::time::sleep_until(self.idle_deadline) => {
                    tracing::info!(room = %self.code(), "room idle, closing");
                    break;
                }
            };

            match cmd {
                RoomCommand::Join {
                    name,
                    subscriber,
                    reply,
                } => {
                    let result = self.handle_join(&name, subscriber);
                    let _ = reply.send(result);
                }
                RoomCommand::Rejoin {
                    player_id,
                    subscriber,
                    reply,
                } => {
                    let result = self.handle_rejoin(player_id, subscriber);
                    let _ = reply.send(result);
                }
                RoomCommand::Act {
                    issuer,
                    action,
                    reply,
                } => {
                    let result = self.handle_action(&issuer, action);
                    let emptied = result.is_ok() && self.state.is_empty();
                    let _ = reply.send(result);
                    if emptied {
                        tracing::info!(room = %self.code(), "last player left, closing");
                        break;
                    }
                }
                RoomCommand::Unsubscribe { id } => {
                    self.subscribers.remove(&id);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(Arc::clone(&self.snapshot));
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.code(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.code(), "room actor stopped");
    }

    fn handle_join(&mut self, name: &str, subscriber: Subscriber) -> Result<Joined, RoomError> {
        let player = self.state.join(name)?;
        tracing::info!(
            room = %self.code(),
            player = %player.id,
            name = %player.name,
            players = self.state.room().players.len(),
            "player joined"
        );
        self.subscribe(player.id.clone(), subscriber);
        self.publish();
        Ok(Joined {
            room: Arc::clone(&self.snapshot),
            player,
        })
    }

    fn handle_rejoin(&mut self, player_id: PlayerId, subscriber: Subscriber) -> Result<Joined, RoomError> {
        let player = self.state.rejoin(&player_id)?;
        tracing::info!(room = %self.code(), player = %player.id, "player rejoined");
        self.subscribe(player_id, subscriber);
        self.idle_deadline = Instant::now() + self.idle_ttl;
        Ok(Joined {
            room: Arc::clone(&self.snapshot),
            player,
        })
    }

    fn handle_action(&mut self, issuer: &PlayerId, action: Action) -> Result<(), RoomError> {
        let name = action.name();
        let result = self.apply(issuer, action);
        match &result {
            Ok(()) => self.publish(),
            Err(e) => {
                tracing::debug!(room = %self.code(), player = %issuer, action = name, error = %e, "action rejected");
            }
        }
        result
    }

    fn apply(&mut self, issuer: &PlayerId, action: Action) -> Result<(), RoomError> {
        let room = self.snapshot.id.clone();
        match action {
            Action::Start => {
                self.state.start(issuer)?;
                tracing::info!(%room, players = self.state.room().players.len(), "game started");
            }
            Action::Kick { target } => {
                let kicked = self.state.kick(issuer, &target)?;
                tracing::info!(%room, player = %kicked.id, name = %kicked.name, "player kicked");
            }
            Action::Leave => {
                let left = self.state.leave(issuer)?;
                tracing::info!(%room, player = %left.id, name = %left.name, "player left");
            }
            Action::UpdateBoard { board } => self.state.update_board(issuer, board)?,
            Action::SubmitNumber { number } => {
                let n = self.state.submit_number(issuer, number)?;
                tracing::debug!(%room, player = %issuer, number = n, "number called");
            }
            Action::DrawNumber => {
                let n = self.state.draw_number(issuer)?;
                tracing::debug!(%room, player = %issuer, number = n, "number drawn");
            }
            Action::MarkCell { row, col } => {
                self.state.mark_cell(issuer, row, col)?;
            }
            Action::DeclareWin => {
                self.state.declare_win(issuer)?;
                tracing::info!(%room, winner = ?self.state.room().winner, "game won");
            }
            Action::Restart => {
                self.state.restart(issuer)?;
                tracing::info!(%room, "game restarted");
            }
            Action::SendMessage { text } => self.state.send_message(issuer, &text)?,
        }
        Ok(())
    }

    fn subscribe(&mut self, player: PlayerId, subscriber: Subscriber) {
        self.subscribers.insert(
            subscriber.id,
            Subscription {
                player,
                updates: subscriber.updates,
            },
        );
    }

    /// Refreshes the cached snapshot and sends it to every subscriber.
    ///
    /// Subscribers whose player is no longer in the room get this one
    /// last snapshot (so they can see they were removed) and are then
    /// dropped. Closed channels are dropped too.
    fn publish(&mut self) {
        self.snapshot = Arc::new(self.state.room().clone());
        self.idle_deadline = Instant::now() + self.idle_ttl;

        let update = RoomUpdate {
            seq: self.snapshot.version,
            room: Arc::clone(&self.snapshot),
        };
        let room = &self.snapshot;
        self.subscribers.retain(|_, sub| {
            let delivered = sub.updates.send(update.clone()).is_ok();
            delivered && room.player(&sub.player).is_some()
        });
    }
}

/// Spawns a new room actor and returns a handle to it.
///
/// `config.command_buffer` bounds the command channel; senders wait when
/// it is full.
pub(crate) fn spawn_room(state: RoomState, config: &RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);
    let snapshot = Arc::new(state.room().clone());
    let code = snapshot.id.clone();

    let actor = RoomActor {
        state,
        snapshot,
        subscribers: HashMap::new(),
        idle_ttl: config.idle_ttl,
        idle_deadline: Instant::now() + config.idle_ttl,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
