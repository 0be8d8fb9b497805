//! [`Feed`] of [`Message`] changes.

use futures::stream;
use tokio::sync::broadcast;
use tracing as log;

use crate::{
    domain::user,
    read::message::{Change, Changes},
};
#[cfg(doc)]
use crate::domain::Message;

/// In-process fan-out hub of [`Message`] [`Change`]s.
///
/// Every subscriber receives only the [`Change`]s of [`Message`]s addressed
/// to its user.
#[derive(Clone, Debug)]
pub struct Feed {
    /// Sending half of the underlying channel.
    sender: broadcast::Sender<Event>,
}

/// Event sent through a [`Feed`] channel.
#[derive(Clone, Copy, Debug)]
enum Event {
    /// [`Change`] of a single [`Message`].
    Change(Change),

    /// Every subscriber may have missed some [`Change`]s.
    Resync,
}

impl Feed {
    /// Number of [`Change`]s buffered for a slow subscriber before it starts
    /// missing them.
    pub const CAPACITY: usize = 1024;

    /// Creates a new [`Feed`] without subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(Self::CAPACITY);
        Self { sender }
    }

    /// Publishes the provided [`Change`] to all the current subscribers.
    ///
    /// Does nothing if there are no subscribers.
    pub fn publish(&self, change: Change) {
        _ = self.sender.send(Event::Change(change));
    }

    /// Makes every current subscriber receive a [`ChangeKind::Missed`], so
    /// it re-reads whatever it derives from the [`Change`]s.
    ///
    /// Used once [`Change`]s might have been lost upstream, while the
    /// source of them was reconnecting.
    ///
    /// [`ChangeKind::Missed`]: crate::read::message::ChangeKind::Missed
    pub fn resync(&self) {
        _ = self.sender.send(Event::Resync);
    }

    /// Returns the number of the current subscribers.
    #[must_use]
    pub fn subscribers(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Subscribes to the [`Change`]s of [`Message`]s addressed to the
    /// provided `receiver`.
    ///
    /// The subscription is active once this method returns, so no [`Change`]
    /// published afterwards is missed. A subscriber lagging behind receives a
    /// single [`ChangeKind::Missed`] instead of the dropped [`Change`]s.
    ///
    /// [`ChangeKind::Missed`]: crate::read::message::ChangeKind::Missed
    #[must_use]
    pub fn subscribe(&self, receiver: user::Id) -> Changes {
        let rx = self.sender.subscribe();
        Changes::new(stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(Event::Change(change))
                        if change.receiver_id == receiver =>
                    {
                        return Some((change, rx));
                    }
                    Ok(Event::Change(_)) => {}
                    Ok(Event::Resync) => {
                        return Some((Change::missed(receiver), rx));
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        log::warn!(
                            "`Feed` subscriber of `User(id: {receiver})` \
                             missed {n} changes",
                        );
                        return Some((Change::missed(receiver), rx));
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}

impl Default for Feed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod spec {
    use futures::{FutureExt as _, StreamExt as _};

    use crate::{
        domain::{message, user},
        read::message::{Change, ChangeKind},
    };

    use super::Feed;

    fn change(receiver_id: user::Id) -> Change {
        Change {
            kind: ChangeKind::Insert,
            message_id: Some(message::Id::new()),
            receiver_id,
        }
    }

    #[tokio::test]
    async fn delivers_only_own_changes() {
        let feed = Feed::new();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let mut changes = feed.subscribe(alice);

        let theirs = change(bob);
        let ours = change(alice);
        feed.publish(theirs);
        feed.publish(ours);

        assert_eq!(changes.next().await, Some(ours));
        assert!(changes.next().now_or_never().is_none());
    }

    #[tokio::test]
    async fn releases_subscription_on_drop() {
        let feed = Feed::new();
        let changes = feed.subscribe(user::Id::new());
        assert_eq!(feed.subscribers(), 1);

        drop(changes);
        assert_eq!(feed.subscribers(), 0);
    }

    #[tokio::test]
    async fn reports_missed_changes() {
        let feed = Feed::new();
        let alice = user::Id::new();
        let mut changes = feed.subscribe(alice);

        for _ in 0..=Feed::CAPACITY {
            feed.publish(change(alice));
        }

        assert_eq!(changes.next().await, Some(Change::missed(alice)));
    }

    #[tokio::test]
    async fn resyncs_every_subscriber() {
        let feed = Feed::new();
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let mut alice_changes = feed.subscribe(alice);
        let mut bob_changes = feed.subscribe(bob);

        feed.resync();

        assert_eq!(alice_changes.next().await, Some(Change::missed(alice)));
        assert_eq!(bob_changes.next().await, Some(Change::missed(bob)));
        assert!(alice_changes.next().now_or_never().is_none());
    }
}
