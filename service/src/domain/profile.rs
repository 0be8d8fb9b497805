//! [`Profile`] definitions.

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

use crate::domain::user;

/// Public profile of a marketplace user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Profile {
    /// ID of the [`user`] this [`Profile`] belongs to.
    pub user_id: user::Id,

    /// Full name of the [`user`].
    pub full_name: String,

    /// Unique public [`Username`] of the [`user`].
    pub username: Username,

    /// Short story about the [`user`], if any.
    pub bio: Option<String>,

    /// Contact phone number of the [`user`], if any.
    pub phone: Option<String>,
}

/// Unique public handle of a [`Profile`].
///
/// Compared ignoring ASCII case when checked for uniqueness.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Username(String);

impl Username {
    /// Creates a new [`Username`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Indicates whether this [`Username`] is the same as the `other` one,
    /// ignoring ASCII case.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Checks whether the given `name` is a valid [`Username`].
    fn check(name: &str) -> bool {
        (3..=30).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[cfg(test)]
mod spec {
    use super::Username;

    #[test]
    fn username_format() {
        assert!(Username::new("powder_hound").is_some());
        assert!(Username::new("ab").is_none());
        assert!(Username::new("powder hound").is_none());
        assert!(Username::new("x".repeat(31)).is_none());
    }

    #[test]
    fn usernames_compare_ignoring_case() {
        let a = Username::new("Powder_Hound").unwrap();
        let b = Username::new("powder_hound").unwrap();

        assert_ne!(a, b);
        assert!(a.is_same(&b));
    }
}
