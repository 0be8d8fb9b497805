//! GraphQL [`Subscription`]s definitions.

use common::DateTime;
use futures::{
    stream::{self, BoxStream},
    FutureExt as _, StreamExt as _,
};
use juniper::graphql_subscription;
use service::sync;

use crate::{context, Context, Error};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription waiting for the current authenticated session to expire.
    ///
    /// Yields a `SESSION_EXPIRED` error once it does.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated;
    /// - `INVALID_TOKEN` - if the provided access token is invalid;
    /// - `SESSION_EXPIRED` - if the current session has already expired.
    pub async fn wait_session(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<bool, Error>>, Error> {
        let session = ctx.current_session().await?;
        let timeout = session.expires_at - DateTime::now();
        Ok(stream::once(
            tokio::time::sleep(timeout).map(|()| {
                Err(context::AuthError::SessionExpired.into())
            }),
        )
        .boxed())
    }

    /// Live number of unread `Message`s addressed to the current `User`.
    ///
    /// Yields the current number at once, and a fresh one every time a
    /// `Message` of the `User` is sent, read or deleted.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - if the current session is not
    ///                              authenticated.
    pub async fn unread_messages_count(
        &self,
        ctx: &Context,
    ) -> Result<BoxStream<'static, Result<i32, Error>>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        Ok(sync::unread_counts(ctx.service().clone(), my_id.into())
            .map(|count| Ok(count.into()))
            .boxed())
    }
}
