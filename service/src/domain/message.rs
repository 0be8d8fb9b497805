//! [`Message`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{listing, user};

/// Direct message between two users, optionally about a [`listing`].
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// ID of this [`Message`].
    pub id: Id,

    /// ID of the [`user`] who sent this [`Message`].
    pub sender_id: user::Id,

    /// ID of the [`user`] this [`Message`] is addressed to.
    pub receiver_id: user::Id,

    /// ID of the [`listing`] this [`Message`] is about, if any.
    pub listing_id: Option<listing::Id>,

    /// [`Body`] of this [`Message`].
    pub body: Body,

    /// Indicator whether the receiver has read this [`Message`].
    pub read: bool,

    /// [`DateTime`] when this [`Message`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Message`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Text of a [`Message`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Body(String);

impl Body {
    /// Maximum number of characters in a [`Body`].
    pub const MAX_LEN: usize = 1000;

    /// Creates a new [`Body`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Body`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Body {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Body`")
    }
}

/// [`DateTime`] when a [`Message`] was created.
pub type CreationDateTime = DateTimeOf<(Message, unit::Creation)>;
