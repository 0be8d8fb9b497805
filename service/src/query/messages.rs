//! [`Query`] collection related to the multiple [`Message`]s.

use common::operations::By;

use crate::{domain::user, read};
#[cfg(doc)]
use crate::{domain::Message, Query};

use super::{DatabaseQuery, DatabaseSubscription};

/// Counts unread [`Message`]s addressed to a user.
pub type UnreadCount =
    DatabaseQuery<By<read::message::unread::Count, user::Id>>;

/// Subscribes to [`read::message::Changes`] of [`Message`]s addressed to a
/// user.
pub type Changes =
    DatabaseSubscription<By<read::message::Changes, user::Id>>;
