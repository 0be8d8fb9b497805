//! [`Listing`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Piece of gear offered on the marketplace.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    /// ID of this [`Listing`].
    pub id: Id,

    /// ID of the [`user`] selling this [`Listing`].
    pub seller_id: user::Id,

    /// [`Title`] of this [`Listing`].
    pub title: Title,

    /// [`Description`] of this [`Listing`].
    pub description: Description,

    /// [`Category`] of this [`Listing`].
    pub category: Category,

    /// [`Condition`] of this [`Listing`].
    pub condition: Condition,

    /// [`Size`] of this [`Listing`], if applicable.
    pub size: Option<Size>,

    /// [`Price`] of this [`Listing`].
    ///
    /// Absent for listings offered for trade only.
    pub price: Option<Price>,

    /// Indicator whether this [`Listing`] is offered for trade only.
    pub trade_only: bool,

    /// [`ImageUrl`]s of this [`Listing`] in display order.
    pub images: Vec<ImageUrl>,

    /// [`Status`] of this [`Listing`].
    pub status: Status,

    /// [`DateTime`] when this [`Listing`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Listing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Minimum number of characters in a [`Title`].
    pub const MIN_LEN: usize = 3;

    /// Maximum number of characters in a [`Title`].
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title
            && (Self::MIN_LEN..=Self::MAX_LEN)
                .contains(&title.chars().count())
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Description of a [`Listing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Maximum number of characters in a [`Description`].
    pub const MAX_LEN: usize = 2000;

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Size of a [`Listing`] (boot mondo point, ski length, apparel size, etc).
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Size(String);

impl Size {
    /// Maximum number of characters in a [`Size`].
    pub const MAX_LEN: usize = 50;

    /// Creates a new [`Size`] if the given `size` is valid.
    #[must_use]
    pub fn new(size: impl Into<String>) -> Option<Self> {
        let size = size.into();
        Self::check(&size).then_some(Self(size))
    }

    /// Checks whether the given `size` is a valid [`Size`].
    fn check(size: impl AsRef<str>) -> bool {
        let size = size.as_ref();
        size.trim() == size
            && !size.is_empty()
            && size.chars().count() <= Self::MAX_LEN
    }
}

impl FromStr for Size {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Size`")
    }
}

/// Price of a [`Listing`] in dollars.
#[derive(
    AsRef, Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// Upper bound of a [`Price`], exclusive.
    pub const LIMIT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

    /// Creates a new [`Price`] if the given `amount` is valid.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        Self::check(amount).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Checks whether the given `amount` is a valid [`Price`].
    fn check(amount: Decimal) -> bool {
        !amount.is_sign_negative() && amount < Self::LIMIT
    }
}

impl TryFrom<Decimal> for Price {
    type Error = &'static str;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount).ok_or("invalid `Price`")
    }
}

/// URL of a [`Listing`] image in the file storage.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ImageUrl(String);

impl ImageUrl {
    /// Maximum number of images a [`Listing`] may have.
    pub const MAX_PER_LISTING: usize = 6;

    /// Creates a new [`ImageUrl`] if the given `url` is valid.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Option<Self> {
        let url = url.into();
        Self::check(&url).then_some(Self(url))
    }

    /// Checks whether the given `url` is a valid [`ImageUrl`].
    fn check(url: impl AsRef<str>) -> bool {
        let url = url.as_ref();
        (url.starts_with("https://") || url.starts_with("http://"))
            && !url.contains(char::is_whitespace)
            && url.len() <= 2048
    }
}

impl FromStr for ImageUrl {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ImageUrl`")
    }
}

define_kind! {
    #[doc = "Category of a [`Listing`]."]
    enum Category {
        #[doc = "Skis."]
        Skis = 1,

        #[doc = "Snowboards."]
        Snowboards = 2,

        #[doc = "Ski or snowboard boots."]
        Boots = 3,

        #[doc = "Bindings."]
        Bindings = 4,

        #[doc = "Poles."]
        Poles = 5,

        #[doc = "Helmets."]
        Helmets = 6,

        #[doc = "Goggles."]
        Goggles = 7,

        #[doc = "Outerwear and layers."]
        Apparel = 8,

        #[doc = "Bags, tools, wax and other accessories."]
        Accessories = 9,

        #[doc = "Anything else."]
        Other = 10,
    }
}

define_kind! {
    #[doc = "Condition of a [`Listing`]."]
    enum Condition {
        #[doc = "Never used, tags on."]
        New = 1,

        #[doc = "Used a few days, no visible wear."]
        LikeNew = 2,

        #[doc = "Normal wear, fully functional."]
        Good = 3,

        #[doc = "Noticeable wear, functional."]
        Fair = 4,

        #[doc = "Heavily used, for parts or rock days."]
        Worn = 5,
    }
}

define_kind! {
    #[doc = "Status of a [`Listing`]."]
    enum Status {
        #[doc = "Visible in the marketplace."]
        Active = 1,

        #[doc = "Sold by the seller."]
        Sold = 2,

        #[doc = "Hidden by the seller."]
        Archived = 3,

        #[doc = "Removed by a moderator."]
        Removed = 4,
    }
}

/// [`DateTime`] when a [`Listing`] was created.
pub type CreationDateTime = DateTimeOf<(Listing, unit::Creation)>;

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::{Category, Condition, ImageUrl, Price, Title};

    #[test]
    fn title_bounds() {
        assert!(Title::new("Atomic Bent 100").is_some());
        assert!(Title::new("ab").is_none());
        assert!(Title::new(" padded ").is_none());
        assert!(Title::new("x".repeat(Title::MAX_LEN)).is_some());
        assert!(Title::new("x".repeat(Title::MAX_LEN + 1)).is_none());
    }

    #[test]
    fn price_bounds() {
        assert!(Price::new(Decimal::ZERO).is_some());
        assert!(Price::new(Decimal::new(19999, 2)).is_some());
        assert!(Price::new(Decimal::new(-5, 0)).is_none());
        assert!(Price::new(Price::LIMIT).is_none());
    }

    #[test]
    fn image_url_requires_http() {
        assert!(ImageUrl::new("https://cdn.example.com/a.jpg").is_some());
        assert!(ImageUrl::new("ftp://cdn.example.com/a.jpg").is_none());
        assert!(ImageUrl::new("https://cdn.example.com/a b.jpg").is_none());
    }

    #[test]
    fn kinds_parse_ignoring_case() {
        assert_eq!("Skis".parse::<Category>(), Ok(Category::Skis));
        assert_eq!("BOOTS".parse::<Category>(), Ok(Category::Boots));
        assert_eq!("like_new".parse::<Condition>(), Ok(Condition::LikeNew));
        assert!("Skates".parse::<Category>().is_err());
        assert_eq!(Category::ALL.len(), 10);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn kinds_serialize_in_screaming_case() {
        assert_eq!(
            serde_json::to_string(&Condition::LikeNew).unwrap(),
            r#""LIKE_NEW""#,
        );
        assert_eq!(
            serde_json::from_str::<Category>(r#""SNOWBOARDS""#).unwrap(),
            Category::Snowboards,
        );
    }
}
