//! [`Command`] definition.

pub mod authorize_user_session;
pub mod create_listing;
pub mod mark_message_read;
pub mod send_message;
pub mod submit_enrollment;
pub mod update_listing_status;
pub mod update_profile;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    create_listing::CreateListing, mark_message_read::MarkMessageRead,
    send_message::SendMessage, submit_enrollment::SubmitEnrollment,
    update_listing_status::UpdateListingStatus, update_profile::UpdateProfile,
};
