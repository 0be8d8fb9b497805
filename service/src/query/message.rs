//! [`Query`] collection related to a single [`Message`].

use common::operations::By;

use crate::domain::{message, Message};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Message`] by its [`message::Id`].
pub type ById = DatabaseQuery<By<Option<Message>, message::Id>>;
