//! GraphQL [`Query`]s definitions.

use common::pagination::Number;
use juniper::graphql_object;
use service::{domain, query, search, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Searches active `Listing`s.
    ///
    /// Returns the requested page (12 `Listing`s at most) along with the
    /// total number of `Listing`s matching the `filter`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PAGE` - the `page` is not positive.
    #[tracing::instrument(
        skip_all,
        fields(
            filter = ?filter,
            gql.name = "listings",
            otel.name = Self::SPAN_NAME,
            page = ?page,
        ),
    )]
    pub async fn listings(
        filter: Option<api::listing::list::Filter>,
        page: Option<i32>,
        ctx: &Context,
    ) -> Result<api::listing::list::Page, Error> {
        let page = page
            .map_or(Ok(Number::FIRST), Number::try_from)
            .map_err(|_| api::PaginationError::InvalidPage.into())
            .map_err(ctx.error())?;
        let filters = search::Filters::from(filter.unwrap_or_default());

        ctx.service()
            .execute(query::listings::Search::by(filters.selector(page)))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Listing` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "listing",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn listing(
        id: api::listing::Id,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        ctx.service()
            .execute(query::listing::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ListingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Message` with the specified ID.
    ///
    /// Only the sender and the receiver of the `Message` may see it.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `MESSAGE_NOT_EXISTS` - the `Message` with the specified ID does not
    ///                          exist or is not visible.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "message",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn message(
        id: api::message::Id,
        ctx: &Context,
    ) -> Result<api::Message, Error> {
        let my_id: domain::user::Id =
            ctx.current_session().await?.user_id.into();

        ctx.service()
            .execute(query::message::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .filter(|m| m.sender_id == my_id || m.receiver_id == my_id)
            .ok_or_else(|| MessageError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the number of unread `Message`s addressed to the current
    /// `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "unreadMessagesCount",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn unread_messages_count(ctx: &Context) -> Result<i32, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::messages::UnreadCount::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Profile` of the current `User`, if it was ever filled.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myProfile",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_profile(
        ctx: &Context,
    ) -> Result<Option<api::Profile>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::profile::ByUserId::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| p.map(Into::into))
    }

    /// Returns the `Enrollment`s submitted by the current `User`, the most
    /// recent first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myEnrollments",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_enrollments(
        ctx: &Context,
    ) -> Result<Vec<api::Enrollment>, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(query::enrollments::ByParent::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }
}

define_error! {
    enum ListingError {
        #[code = "LISTING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Listing` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum MessageError {
        #[code = "MESSAGE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Message` with the specified ID does not exist"]
        NotExists,
    }
}
