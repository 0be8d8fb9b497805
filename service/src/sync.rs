//! Live unread [`Message`]s counts.
//!
//! Counts are always re-read from the [`Database`] once a change is
//! reported, and are never derived from the change itself.

use std::{fmt, pin::pin};

use futures::{future, stream, Stream, StreamExt as _};
use tokio::{sync::watch, task};
use tracing as log;

use crate::{
    domain::user,
    query,
    read::message::{unread, Changes},
    Query,
};
#[cfg(doc)]
use crate::{domain::Message, infra::Database};

/// Streams unread [`Message`]s counts of the provided `user`.
///
/// Subscribes to the changes first, then yields the initial count and a
/// fresh count after every change. Counts failed to be read are skipped.
///
/// Dropping the returned [`Stream`] releases the subscription.
pub fn unread_counts<S>(
    service: S,
    user: user::Id,
) -> impl Stream<Item = unread::Count>
where
    S: Query<query::messages::Changes, Ok = Changes, Err: fmt::Display>
        + Query<
            query::messages::UnreadCount,
            Ok = unread::Count,
            Err: fmt::Display,
        > + Clone,
{
    let subscriber = service.clone();
    stream::once(async move { subscribe(&subscriber, user).await })
        .flat_map(|changes| {
            stream::once(future::ready(()))
                .chain(stream::iter(changes).flatten().map(drop))
        })
        .then(move |()| {
            let service = service.clone();
            async move { count(&service, user).await }
        })
        .filter_map(future::ready)
}

/// Subscribes to the [`Changes`] of the provided `user`'s [`Message`]s.
///
/// [`None`] if the subscription failed, so no live updates are possible.
async fn subscribe<S>(service: &S, user: user::Id) -> Option<Changes>
where
    S: Query<query::messages::Changes, Ok = Changes, Err: fmt::Display>,
{
    service
        .execute(query::messages::Changes::by(user))
        .await
        .map_err(|e| {
            log::error!("failed to subscribe to `User(id: {user})` changes: {e}");
        })
        .ok()
}

/// Reads the unread [`Message`]s count of the provided `user`.
async fn count<S>(service: &S, user: user::Id) -> Option<unread::Count>
where
    S: Query<
        query::messages::UnreadCount,
        Ok = unread::Count,
        Err: fmt::Display,
    >,
{
    service
        .execute(query::messages::UnreadCount::by(user))
        .await
        .map_err(|e| {
            log::warn!("failed to count unread of `User(id: {user})`: {e}");
        })
        .ok()
}

/// Holder of a live unread [`Message`]s count of a single user.
///
/// Every [`UnreadCounter`] keeps its own subscription, which is released on
/// [`UnreadCounter::rebind()`] and on [`Drop`].
///
/// Must be used inside a [`task::LocalSet`].
#[derive(Debug)]
pub struct UnreadCounter<S> {
    /// [`Query`] executor.
    service: S,

    /// ID of the user being counted for.
    user: user::Id,

    /// Latest known count.
    count: watch::Sender<unread::Count>,

    /// Task keeping the count up to date.
    task: task::JoinHandle<()>,
}

impl<S> UnreadCounter<S>
where
    S: Query<query::messages::Changes, Ok = Changes, Err: fmt::Display>
        + Query<
            query::messages::UnreadCount,
            Ok = unread::Count,
            Err: fmt::Display,
        > + Clone
        + 'static,
{
    /// Starts counting unread [`Message`]s of the provided `user`.
    ///
    /// # Panics
    ///
    /// If called outside a [`task::LocalSet`].
    #[must_use]
    pub fn mount(service: S, user: user::Id) -> Self {
        let (count, _) = watch::channel(unread::Count::default());
        let task = spawn(service.clone(), user, count.clone());
        Self {
            service,
            user,
            count,
            task,
        }
    }

    /// Switches counting to the provided `user`.
    ///
    /// The subscription of the previous user is released, and the count is
    /// reset until the new one is read.
    pub fn rebind(&mut self, user: user::Id) {
        if self.user == user {
            return;
        }
        self.task.abort();
        self.user = user;
        _ = self.count.send_replace(unread::Count::default());
        self.task = spawn(self.service.clone(), user, self.count.clone());
    }
}

impl<S> UnreadCounter<S> {
    /// Returns ID of the user being counted for.
    #[must_use]
    pub fn user(&self) -> user::Id {
        self.user
    }

    /// Returns the latest known count.
    #[must_use]
    pub fn get(&self) -> unread::Count {
        *self.count.borrow()
    }

    /// Returns a [`watch::Receiver`] of the count updates.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<unread::Count> {
        self.count.subscribe()
    }
}

impl<S> Drop for UnreadCounter<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a local task publishing [`unread_counts()`] into the provided
/// [`watch::Sender`].
fn spawn<S>(
    service: S,
    user: user::Id,
    count: watch::Sender<unread::Count>,
) -> task::JoinHandle<()>
where
    S: Query<query::messages::Changes, Ok = Changes, Err: fmt::Display>
        + Query<
            query::messages::UnreadCount,
            Ok = unread::Count,
            Err: fmt::Display,
        > + Clone
        + 'static,
{
    task::spawn_local(async move {
        let mut counts = pin!(unread_counts(service, user));
        while let Some(c) = counts.next().await {
            _ = count.send_replace(c);
        }
    })
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Handler as _};
    use futures::StreamExt as _;
    use tokio::task::{self, LocalSet};

    use crate::{
        domain::{message, user, Message},
        infra::Memory,
        read::message::{unread, Change},
        Service,
    };

    use super::{unread_counts, UnreadCounter};

    fn service(db: &Memory) -> Service<Memory> {
        Service::new(crate::spec::config(b"secret"), db.clone()).0
    }

    async fn send(db: &Memory, receiver_id: user::Id) {
        let msg = Message {
            id: message::Id::new(),
            sender_id: user::Id::new(),
            receiver_id,
            listing_id: None,
            body: message::Body::new("Still available?").unwrap(),
            read: false,
            created_at: message::CreationDateTime::now(),
        };
        db.execute(Insert(msg)).await.unwrap();
    }

    /// Lets the spawned local tasks run.
    async fn settle() {
        for _ in 0..10 {
            task::yield_now().await;
        }
    }

    fn count(n: i32) -> unread::Count {
        n.into()
    }

    #[tokio::test]
    async fn yields_initial_count_then_updates() {
        let db = Memory::new();
        let bob = user::Id::new();
        for _ in 0..3 {
            send(&db, bob).await;
        }

        let mut counts = Box::pin(unread_counts(service(&db), bob));
        assert_eq!(counts.next().await, Some(count(3)));
        assert_eq!(db.feed().subscribers(), 1);

        send(&db, user::Id::new()).await;
        send(&db, bob).await;
        assert_eq!(counts.next().await, Some(count(4)));

        drop(counts);
        assert_eq!(db.feed().subscribers(), 0);
    }

    #[tokio::test]
    async fn requeries_once_resynced() {
        let db = Memory::new();
        let bob = user::Id::new();
        send(&db, bob).await;

        let mut counts = Box::pin(unread_counts(service(&db), bob));
        assert_eq!(counts.next().await, Some(count(1)));
        let selects = db.selects();

        db.feed().resync();

        assert_eq!(counts.next().await, Some(count(1)));
        assert_eq!(db.selects(), selects + 1);
    }

    #[tokio::test]
    async fn requeries_on_every_change() {
        LocalSet::new()
            .run_until(async {
                let db = Memory::new();
                let bob = user::Id::new();
                for _ in 0..3 {
                    send(&db, bob).await;
                }

                let counter = UnreadCounter::mount(service(&db), bob);
                settle().await;
                assert_eq!(counter.get(), count(3));

                let selects = db.selects();
                send(&db, bob).await;
                settle().await;

                assert_eq!(counter.get(), count(4));
                assert_eq!(db.selects(), selects + 1);
            })
            .await;
    }

    #[tokio::test]
    async fn keeps_last_count_on_failure() {
        LocalSet::new()
            .run_until(async {
                let db = Memory::new();
                let bob = user::Id::new();
                for _ in 0..3 {
                    send(&db, bob).await;
                }
                let counter = UnreadCounter::mount(service(&db), bob);
                settle().await;

                db.set_unavailable(true);
                db.feed().publish(Change::missed(bob));
                settle().await;
                assert_eq!(counter.get(), count(3));

                db.set_unavailable(false);
                send(&db, bob).await;
                settle().await;
                assert_eq!(counter.get(), count(4));
            })
            .await;
    }

    #[tokio::test]
    async fn releases_subscription_of_stale_user() {
        LocalSet::new()
            .run_until(async {
                let db = Memory::new();
                let (alice, bob) = (user::Id::new(), user::Id::new());
                send(&db, alice).await;
                for _ in 0..2 {
                    send(&db, bob).await;
                }

                let mut nav = UnreadCounter::mount(service(&db), bob);
                let mobile_nav = UnreadCounter::mount(service(&db), bob);
                settle().await;
                assert_eq!(db.feed().subscribers(), 2);
                assert_eq!(nav.get(), count(2));
                assert_eq!(mobile_nav.get(), count(2));

                nav.rebind(alice);
                settle().await;
                assert_eq!(db.feed().subscribers(), 2);
                assert_eq!(nav.user(), alice);
                assert_eq!(nav.get(), count(1));

                send(&db, bob).await;
                settle().await;
                assert_eq!(nav.get(), count(1));
                assert_eq!(mobile_nav.get(), count(3));

                drop(nav);
                drop(mobile_nav);
                settle().await;
                assert_eq!(db.feed().subscribers(), 0);
            })
            .await;
    }
}
