//! Forms submitted by users.
//!
//! Forms hold the raw user input, which is checked with
//! [`Validate::validate()`] before being turned into domain entities.

pub mod enrollment;
pub mod listing;
pub mod message;
pub mod profile;

use std::sync::LazyLock;

use regex::Regex;

#[cfg(doc)]
use crate::validation::Validate;

pub use self::{
    enrollment::Enrollment, listing::Listing, message::Message,
    profile::Profile,
};

/// Format of a phone number: optional leading `+`, then 7 to 15 digits,
/// optionally grouped with spaces, dashes, dots or parentheses.
static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?(?:[\s.\-()]*\d){7,15}[\s.\-()]*$").expect("valid regex")
});

/// Returns the trimmed `input`, unless it's blank.
fn non_empty(input: &str) -> Option<String> {
    let input = input.trim();
    (!input.is_empty()).then(|| input.to_owned())
}
