//! [`Message`]-related read definitions.

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use derive_more::Debug;
use futures::{stream::BoxStream, Stream, StreamExt as _};
use serde::Deserialize;

use crate::domain::{message, user, Message};

pub mod unread {
    //! Unread [`Message`]s definitions.

    use derive_more::{Display, From, Into};

    #[cfg(doc)]
    use crate::domain::Message;

    /// Number of unread [`Message`]s addressed to a user.
    #[derive(
        Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, PartialEq,
    )]
    pub struct Count(i32);
}

/// Kind of a [`Change`] happened to a [`Message`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    /// [`Message`] was created.
    Insert,

    /// [`Message`] was modified (marked as read, for example).
    Update,

    /// [`Message`] was deleted.
    Delete,

    /// Unknown number of [`Change`]s were missed by a slow subscriber.
    #[serde(skip)]
    Missed,
}

/// Change happened to a [`Message`].
///
/// Only identifies the affected [`Message`]. Anything derived from it must be
/// re-read from the database.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq)]
pub struct Change {
    /// [`ChangeKind`] of this [`Change`].
    #[serde(rename = "op")]
    pub kind: ChangeKind,

    /// ID of the changed [`Message`].
    ///
    /// [`None`] if the [`Change`] is [`ChangeKind::Missed`].
    #[serde(rename = "id")]
    pub message_id: Option<message::Id>,

    /// ID of the user the changed [`Message`] is addressed to.
    pub receiver_id: user::Id,
}

impl Change {
    /// Creates a new [`Change`] of the provided [`Message`].
    #[must_use]
    pub fn of(kind: ChangeKind, msg: &Message) -> Self {
        Self {
            kind,
            message_id: Some(msg.id),
            receiver_id: msg.receiver_id,
        }
    }

    /// Creates a new [`ChangeKind::Missed`] [`Change`] for the provided
    /// receiver.
    #[must_use]
    pub fn missed(receiver_id: user::Id) -> Self {
        Self {
            kind: ChangeKind::Missed,
            message_id: None,
            receiver_id,
        }
    }
}

/// Live stream of [`Change`]s of [`Message`]s addressed to a single user.
///
/// The subscription is released once this [`Changes`] is dropped.
#[derive(Debug)]
pub struct Changes(#[debug(skip)] BoxStream<'static, Change>);

impl Changes {
    /// Wraps the provided `stream` of [`Change`]s.
    #[must_use]
    pub fn new(stream: impl Stream<Item = Change> + Send + 'static) -> Self {
        Self(stream.boxed())
    }
}

impl Stream for Changes {
    type Item = Change;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        self.0.poll_next_unpin(cx)
    }
}
