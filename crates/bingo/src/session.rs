//! Per-connection session: which room and player a connection speaks for.
//!
//! A connection starts unbound. A successful join or rejoin binds it to
//! one (room, player) pair, and from then on every room command it sends
//! is issued as that player. Binding to another room moves the
//! subscription; the session drops its binding when its player is
//! removed from the room.
//!
//! ```text
//!   Unbound ──(join / rejoin)──→ Bound ──(kicked / left)──→ Unbound
//!                                  │ ↑
//!                                  └─┘ (join / rejoin elsewhere)
//! ```

use bingo_protocol::{PlayerId, Room, RoomCode};
use bingo_room::{RoomHandle, SubscriberId};

use crate::GatewayError;

struct Binding {
    handle: RoomHandle,
    player: PlayerId,
}

pub(crate) struct Session {
    subscriber: SubscriberId,
    binding: Option<Binding>,
}

impl Session {
    pub(crate) fn new(subscriber: SubscriberId) -> Self {
        Self {
            subscriber,
            binding: None,
        }
    }

    pub(crate) fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }

    pub(crate) fn room(&self) -> Option<&RoomCode> {
        self.binding.as_ref().map(|b| b.handle.code())
    }

    pub(crate) fn player(&self) -> Option<&PlayerId> {
        self.binding.as_ref().map(|b| &b.player)
    }

    /// Binds to a player in a room. A subscription held in a different
    /// room is released.
    pub(crate) async fn bind(&mut self, handle: RoomHandle, player: PlayerId) {
        if let Some(old) = self.binding.take() {
            if old.handle.code() != handle.code() {
                old.handle.unsubscribe(self.subscriber).await;
            }
        }
        self.binding = Some(Binding { handle, player });
    }

    /// Resolves who is issuing a command against `room`.
    ///
    /// `claimed` is the optional `playerId` carried by the command; when
    /// present it must be the bound player.
    pub(crate) fn issuer(
        &self,
        room: &RoomCode,
        claimed: Option<&PlayerId>,
    ) -> Result<(RoomHandle, PlayerId), GatewayError> {
        let binding = self
            .binding
            .as_ref()
            .filter(|b| b.handle.code() == room)
            .ok_or_else(|| GatewayError::NotJoined(room.clone()))?;

        if let Some(given) = claimed {
            if given != &binding.player {
                return Err(GatewayError::PlayerMismatch {
                    bound: binding.player.clone(),
                    given: given.clone(),
                });
            }
        }
        Ok((binding.handle.clone(), binding.player.clone()))
    }

    /// Drops the binding when `room` shows the bound player is gone.
    ///
    /// The room has already released the subscription in that case.
    /// Returns `true` if the binding was dropped.
    pub(crate) fn observe(&mut self, room: &Room) -> bool {
        let removed = self
            .binding
            .as_ref()
            .is_some_and(|b| b.handle.code() == &room.id && room.player(&b.player).is_none());
        if removed {
            self.binding = None;
        }
        removed
    }
}

/// Releases the room subscription when the connection goes away.
///
/// `Drop` is synchronous, so the unsubscribe is sent from a spawned task.
/// The player stays in the room.
impl Drop for Session {
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            let subscriber = self.subscriber;
            tokio::spawn(async move {
                binding.handle.unsubscribe(subscriber).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use bingo_room::{RoomStore, Subscriber};
    use tokio::sync::mpsc;

    use super::*;

    async fn joined(store: &RoomStore, name: &str) -> (RoomHandle, PlayerId) {
        let code = store.create_room(name, 5).await.unwrap();
        let handle = store.room(&code).await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let joined = handle
            .join(
                name,
                Subscriber {
                    id: SubscriberId::new(1),
                    updates: tx,
                },
            )
            .await
            .unwrap();
        (handle, joined.player.id)
    }

    #[tokio::test]
    async fn test_unbound_session_is_not_joined() {
        let session = Session::new(SubscriberId::new(1));
        let code = RoomCode::new("ABCD");
        assert!(matches!(
            session.issuer(&code, None),
            Err(GatewayError::NotJoined(c)) if c == code
        ));
    }

    #[tokio::test]
    async fn test_issuer_checks_room_and_player() {
        let store = RoomStore::default();
        let (handle, ann) = joined(&store, "Ann").await;
        let code = handle.code().clone();

        let mut session = Session::new(SubscriberId::new(1));
        session.bind(handle, ann.clone()).await;

        let (_, issuer) = session.issuer(&code, None).unwrap();
        assert_eq!(issuer, ann);
        assert!(session.issuer(&code, Some(&ann)).is_ok());
        assert!(matches!(
            session.issuer(&code, Some(&PlayerId::new("someone-else"))),
            Err(GatewayError::PlayerMismatch { .. })
        ));
        assert!(matches!(
            session.issuer(&RoomCode::new("ZZZZ"), None),
            Err(GatewayError::NotJoined(_))
        ));
    }

    #[tokio::test]
    async fn test_observe_unbinds_removed_player() {
        let store = RoomStore::default();
        let (handle, ann) = joined(&store, "Ann").await;

        let mut session = Session::new(SubscriberId::new(1));
        session.bind(handle.clone(), ann.clone()).await;

        let present = handle.snapshot().await.unwrap();
        assert!(!session.observe(&present));
        assert_eq!(session.player(), Some(&ann));

        let mut gone = (*present).clone();
        gone.players.clear();
        assert!(session.observe(&gone));
        assert!(session.room().is_none());
    }
}
