//! GraphQL API definitions.

pub mod enrollment;
pub mod listing;
pub mod message;
mod mutation;
pub mod profile;
mod query;
pub mod scalar;
mod subscription;
pub mod user;

use crate::define_error;

pub use self::{
    enrollment::Enrollment, listing::Listing, message::Message,
    mutation::Mutation, profile::Profile, query::Query,
    subscription::Subscription,
};

/// GraphQL schema.
pub type Schema = juniper::RootNode<'static, Query, Mutation, Subscription>;

define_error! {
    enum PaginationError {
        #[code = "INVALID_PAGE"]
        #[status = BAD_REQUEST]
        #[message = "Page number must be positive"]
        InvalidPage,
    }
}
