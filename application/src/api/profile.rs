//! [`Profile`]-related definitions.

use derive_more::From;
use juniper::{graphql_object, GraphQLInputObject};
use service::{domain, form};

use crate::{api, Context};

/// Public profile of a `User`.
#[derive(Clone, Debug, From)]
pub struct Profile(domain::Profile);

/// Public profile of a `User`.
#[graphql_object(context = Context)]
impl Profile {
    /// ID of the `User` this `Profile` belongs to.
    #[must_use]
    pub fn user_id(&self) -> api::user::Id {
        self.0.user_id.into()
    }

    /// Full name of the `User`.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.0.full_name
    }

    /// Unique public handle of the `User`.
    #[must_use]
    pub fn username(&self) -> &str {
        self.0.username.as_ref()
    }

    /// Short story about the `User`.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.0.bio.as_deref()
    }

    /// Contact phone number of the `User`.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }
}

/// Input for updating a `Profile`.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ProfileInput")]
pub struct Input {
    /// Full name, at most 100 characters.
    pub full_name: String,

    /// Username, 3 to 30 letters, digits or underscores.
    pub username: String,

    /// Bio, at most 500 characters.
    pub bio: Option<String>,

    /// Contact phone number.
    pub phone: Option<String>,
}

impl From<Input> for form::Profile {
    fn from(input: Input) -> Self {
        let Input {
            full_name,
            username,
            bio,
            phone,
        } = input;
        Self {
            full_name,
            username,
            bio: bio.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
        }
    }
}
