//! [`Message`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A direct message between `User`s.
#[derive(Clone, Debug, From)]
pub struct Message(domain::Message);

/// A direct message between `User`s.
#[graphql_object(context = Context)]
impl Message {
    /// Unique identifier of this `Message`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `User` who sent this `Message`.
    #[must_use]
    pub fn sender_id(&self) -> api::user::Id {
        self.0.sender_id.into()
    }

    /// ID of the `User` this `Message` is addressed to.
    #[must_use]
    pub fn receiver_id(&self) -> api::user::Id {
        self.0.receiver_id.into()
    }

    /// ID of the `Listing` this `Message` is about, if any.
    #[must_use]
    pub fn listing_id(&self) -> Option<api::listing::Id> {
        self.0.listing_id.map(Into::into)
    }

    /// Text of this `Message`.
    #[must_use]
    pub fn body(&self) -> &str {
        self.0.body.as_ref()
    }

    /// Indicator whether the receiver has read this `Message`.
    #[must_use]
    pub fn read(&self) -> bool {
        self.0.read
    }

    /// `DateTime` when this `Message` was sent.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Message`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::message::Id)]
#[into(domain::message::Id)]
#[graphql(name = "MessageId", transparent)]
pub struct Id(Uuid);
