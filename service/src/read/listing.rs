//! [`Listing`]-related read definitions.

#[cfg(doc)]
use crate::domain::Listing;

pub mod list {
    //! [`Listing`] search definitions.

    use std::num::NonZeroU32;

    use common::define_pagination;
    use derive_more::{AsRef, Display};
    use rust_decimal::Decimal;
    use smart_default::SmartDefault;

    use crate::domain::{listing, Listing};

    define_pagination!(Listing, Filter, Sort);

    /// Number of [`Listing`]s on a single [`Page`].
    pub const PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(12) {
        Some(size) => size,
        None => unreachable!(),
    };

    /// Predicates a [`Listing`] must satisfy to appear on a [`Page`].
    ///
    /// Only active [`Listing`]s are ever selected, regardless of the
    /// [`Filter`].
    #[derive(Clone, Debug, Default, PartialEq)]
    pub struct Filter {
        /// [`listing::Category`] to match, if any.
        pub category: Option<listing::Category>,

        /// [`listing::Condition`] to match, if any.
        pub condition: Option<listing::Condition>,

        /// Text the [`listing::Size`] must contain, if any.
        pub size: Option<Substring>,

        /// Text either the [`listing::Title`] or the
        /// [`listing::Description`] must contain, if any.
        pub search: Option<Substring>,

        /// Required value of [`Listing::trade_only`], if any.
        pub trade_only: Option<bool>,

        /// Inclusive [`PriceRange`].
        pub price: PriceRange,
    }

    /// Inclusive range of [`listing::Price`]s.
    ///
    /// [`Listing`]s without a [`listing::Price`] never match a bounded
    /// range.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct PriceRange {
        /// Lower bound, if any.
        pub min: Option<Decimal>,

        /// Upper bound, if any.
        pub max: Option<Decimal>,
    }

    impl PriceRange {
        /// Indicates whether this [`PriceRange`] has any bound.
        #[must_use]
        pub fn is_bounded(&self) -> bool {
            self.min.is_some() || self.max.is_some()
        }

        /// Checks whether the provided `price` lies in this [`PriceRange`].
        #[must_use]
        pub fn contains(&self, price: Option<listing::Price>) -> bool {
            if !self.is_bounded() {
                return true;
            }
            let Some(price) = price.map(listing::Price::amount) else {
                return false;
            };
            self.min.map_or(true, |min| price >= min)
                && self.max.map_or(true, |max| price <= max)
        }
    }

    /// Non-empty text to search for, case-insensitively.
    #[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
    #[as_ref(str)]
    pub struct Substring(String);

    impl Substring {
        /// Creates a new [`Substring`] out of the given `input`.
        ///
        /// Surrounding whitespace is ignored, and [`None`] is returned if
        /// nothing remains.
        #[must_use]
        pub fn new(input: &str) -> Option<Self> {
            let input = input.trim();
            (!input.is_empty()).then(|| Self(input.to_owned()))
        }

        /// Checks whether the provided `text` contains this [`Substring`]
        /// ignoring case.
        #[must_use]
        pub fn is_in(&self, text: &str) -> bool {
            text.to_lowercase().contains(&self.0.to_lowercase())
        }
    }

    /// Order of [`Listing`]s on a [`Page`].
    ///
    /// Listings equal by the primary key are ordered by their ID, so the
    /// same [`Selector`] always yields the same [`Page`].
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, SmartDefault)]
    pub enum Sort {
        /// Most recently created first.
        #[default]
        Newest,

        /// Least recently created first.
        Oldest,

        /// Cheapest first, listings without a price last.
        PriceLow,

        /// Most expensive first, listings without a price last.
        PriceHigh,
    }
}
