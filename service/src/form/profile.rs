//! [`Profile`] form.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    domain::{self, profile, user},
    validation::{Errors, Validate},
};

use super::{non_empty, PHONE};

/// Allowed characters of a username.
static USERNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[A-Za-z0-9_]+$").expect("valid regex")
});

/// Form editing a public user profile.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Profile {
    /// Full name of the user.
    pub full_name: String,

    /// Unique public handle of the user.
    pub username: String,

    /// Short story about the user.
    pub bio: String,

    /// Contact phone number.
    pub phone: String,
}

impl Validate for Profile {
    fn validate(&self) -> Errors {
        let mut errors = Errors::new();

        _ = errors
            .field("full_name", &self.full_name)
            .required("Full name is required")
            .max_chars(100, "Full name must be at most 100 characters");
        _ = errors
            .field("username", &self.username)
            .required("Username is required")
            .min_chars(3, "Username must be between 3 and 30 characters")
            .max_chars(30, "Username must be between 3 and 30 characters")
            .matches(
                &USERNAME,
                "Username may only contain letters, numbers and underscores",
            );
        _ = errors
            .field("bio", &self.bio)
            .optional()
            .max_chars(500, "Bio must be at most 500 characters");
        _ = errors
            .field("phone", &self.phone)
            .optional()
            .matches(&PHONE, "Invalid phone number");

        errors
    }
}

impl Profile {
    /// Validates this [`Profile`] form and turns it into the
    /// [`domain::Profile`] of the provided user.
    ///
    /// # Errors
    ///
    /// If this [`Profile`] form is invalid.
    pub fn into_profile(
        self,
        user_id: user::Id,
    ) -> Result<domain::Profile, Errors> {
        self.validate().into_result()?;

        let username =
            profile::Username::new(self.username.trim()).ok_or_else(|| {
                let mut errors = Errors::new();
                errors.add("username", "Invalid value");
                errors
            })?;
        Ok(domain::Profile {
            user_id,
            full_name: self.full_name.trim().to_owned(),
            username,
            bio: non_empty(&self.bio),
            phone: non_empty(&self.phone),
        })
    }
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, validation::Validate as _};

    use super::Profile;

    fn valid() -> Profile {
        Profile {
            full_name: "Jordan Rivers".into(),
            username: "powder_hound".into(),
            bio: String::new(),
            phone: String::new(),
        }
    }

    #[test]
    fn accepts_valid_form() {
        assert!(valid().validate().is_empty());
        assert!(Profile {
            phone: "+1 (303) 555-0142".into(),
            bio: "Telemark forever.".into(),
            ..valid()
        }
        .validate()
        .is_empty());
    }

    #[test]
    fn checks_username() {
        let errors = Profile {
            username: "ab".into(),
            ..valid()
        }
        .validate();
        assert_eq!(
            errors.get("username"),
            Some("Username must be between 3 and 30 characters"),
        );

        let errors = Profile {
            username: "powder hound!".into(),
            ..valid()
        }
        .validate();
        assert_eq!(
            errors.get("username"),
            Some("Username may only contain letters, numbers and underscores"),
        );
    }

    #[test]
    fn checks_phone_only_when_given() {
        let errors = Profile {
            phone: "call me".into(),
            ..valid()
        }
        .validate();

        assert_eq!(errors.get("phone"), Some("Invalid phone number"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn converts_into_profile() {
        let me = user::Id::new();
        let profile = Profile {
            full_name: " Jordan Rivers ".into(),
            bio: "Telemark forever.".into(),
            ..valid()
        }
        .into_profile(me)
        .unwrap();

        assert_eq!(profile.user_id, me);
        assert_eq!(profile.full_name, "Jordan Rivers");
        assert_eq!(AsRef::<str>::as_ref(&profile.username), "powder_hound");
        assert_eq!(profile.bio.as_deref(), Some("Telemark forever."));
        assert_eq!(profile.phone, None);
    }
}
