//! GraphQL [`Mutation`]s definitions.

use juniper::graphql_object;
use service::{command, form, Command as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new active `Listing` sold by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `VALIDATION_FAILED` - the `input` is invalid, the error messages of
    ///                         the invalid fields are listed in the `fields`
    ///                         extension.
    #[tracing::instrument(
        skip_all,
        fields(
            category = %input.category,
            gql.name = "createListing",
            otel.name = Self::SPAN_NAME,
            title = %input.title,
        ),
    )]
    pub async fn create_listing(
        input: api::listing::Input,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::CreateListing {
                seller_id: my_id.into(),
                form: input.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the status of the `Listing` sold by the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `LISTING_NOT_EXISTS` - the `Listing` with the specified ID does not
    ///                          exist;
    /// - `NOT_SELLER` - the current `User` doesn't sell the `Listing`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateListingStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn update_listing_status(
        id: api::listing::Id,
        status: api::listing::Status,
        ctx: &Context,
    ) -> Result<api::Listing, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateListingStatus {
                listing_id: id.into(),
                initiator_id: my_id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sends a new `Message` from the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `VALIDATION_FAILED` - the `Message` is empty, too long or addressed
    ///                         to the current `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sendMessage",
            listing_id = ?listing_id.map(|id| id.to_string()),
            otel.name = Self::SPAN_NAME,
            receiver_id = %receiver_id,
        ),
    )]
    pub async fn send_message(
        receiver_id: api::user::Id,
        listing_id: Option<api::listing::Id>,
        body: String,
        ctx: &Context,
    ) -> Result<api::Message, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SendMessage {
                form: form::Message {
                    sender_id: my_id.into(),
                    receiver_id: receiver_id.into(),
                    listing_id: listing_id.map(Into::into),
                    body,
                },
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Marks the `Message` addressed to the current `User` as read.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `MESSAGE_NOT_EXISTS` - the `Message` with the specified ID does not
    ///                          exist;
    /// - `NOT_RECEIVER` - the `Message` is not addressed to the current
    ///                    `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "markMessageRead",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn mark_message_read(
        id: api::message::Id,
        ctx: &Context,
    ) -> Result<api::Message, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::MarkMessageRead {
                message_id: id.into(),
                reader_id: my_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates or updates the `Profile` of the current `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `VALIDATION_FAILED` - the `input` is invalid, the error messages of
    ///                         the invalid fields are listed in the `fields`
    ///                         extension;
    /// - `USERNAME_OCCUPIED` - the username is taken by another `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateProfile",
            otel.name = Self::SPAN_NAME,
            username = %input.username,
        ),
    )]
    pub async fn update_profile(
        input: api::profile::Input,
        ctx: &Context,
    ) -> Result<api::Profile, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::UpdateProfile {
                user_id: my_id.into(),
                form: input.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Enrolls a child of the current `User` into a lesson program.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `VALIDATION_FAILED` - the `input` is invalid, the error messages of
    ///                         the invalid fields are listed in the `fields`
    ///                         extension.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "submitEnrollment",
            otel.name = Self::SPAN_NAME,
            program = %input.program,
        ),
    )]
    pub async fn submit_enrollment(
        input: api::enrollment::Input,
        ctx: &Context,
    ) -> Result<api::Enrollment, Error> {
        let my_id = ctx.current_session().await?.user_id;

        ctx.service()
            .execute(command::SubmitEnrollment {
                parent_id: my_id.into(),
                form: input.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::update_profile::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "USERNAME_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "Username is taken by another `User`"]
                UsernameOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
            Self::UsernameOccupied(_) => Some(Error::UsernameOccupied.into()),
        }
    }
}

impl AsError for command::submit_enrollment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_listing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::update_listing_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "LISTING_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Listing` with the specified ID does not exist"]
                ListingNotExists,

                #[code = "NOT_SELLER"]
                #[status = FORBIDDEN]
                #[message = "Authenticated `User` must be the seller"]
                NotSeller,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ListingNotExists(_) => Some(Error::ListingNotExists.into()),
            Self::NotSeller(_) => Some(Error::NotSeller.into()),
        }
    }
}

impl AsError for command::send_message::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Invalid(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::mark_message_read::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "MESSAGE_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Message` with the specified ID does not exist"]
                MessageNotExists,

                #[code = "NOT_RECEIVER"]
                #[status = FORBIDDEN]
                #[message = "Authenticated `User` must be the receiver"]
                NotReceiver,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::MessageNotExists(_) => Some(Error::MessageNotExists.into()),
            Self::NotReceiver(_) => Some(Error::NotReceiver.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{submit_enrollment, update_profile},
        domain::profile::Username,
        validation,
    };

    use crate::AsError as _;

    #[test]
    fn reports_occupied_username() {
        let username = Username::new("powder_hound").unwrap();
        let err = update_profile::ExecutionError::UsernameOccupied(username)
            .into_error();

        assert_eq!(err.code, "USERNAME_OCCUPIED");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn reports_invalid_enrollment_fields() {
        let mut errors = validation::Errors::new();
        errors.add("student_age", "Student age must be between 4 and 17");

        let err = submit_enrollment::ExecutionError::Invalid(errors)
            .into_error();

        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(
            err.fields.as_ref().and_then(|f| f.get("student_age")),
            Some("Student age must be between 4 and 17"),
        );
    }
}
