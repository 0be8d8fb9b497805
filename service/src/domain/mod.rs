//! Domain definitions.

pub mod enrollment;
pub mod listing;
pub mod message;
pub mod profile;
pub mod user;

pub use self::{
    enrollment::Enrollment, listing::Listing, message::Message,
    profile::Profile,
};
