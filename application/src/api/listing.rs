//! [`Listing`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use rust_decimal::Decimal;
use service::{domain, form};
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    Context,
};

/// A marketplace listing.
#[derive(Clone, Debug, From)]
pub struct Listing(domain::Listing);

/// A marketplace listing.
#[graphql_object(context = Context)]
impl Listing {
    /// Unique identifier of this `Listing`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// ID of the `User` selling this `Listing`.
    #[must_use]
    pub fn seller_id(&self) -> api::user::Id {
        self.0.seller_id.into()
    }

    /// Title of this `Listing`.
    #[must_use]
    pub fn title(&self) -> &str {
        self.0.title.as_ref()
    }

    /// Description of this `Listing`.
    #[must_use]
    pub fn description(&self) -> &str {
        self.0.description.as_ref()
    }

    /// Category of this `Listing`.
    #[must_use]
    pub fn category(&self) -> Category {
        self.0.category.into()
    }

    /// Condition of this `Listing`.
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.0.condition.into()
    }

    /// Size of this `Listing`, if specified.
    #[must_use]
    pub fn size(&self) -> Option<String> {
        self.0.size.as_ref().map(ToString::to_string)
    }

    /// Price of this `Listing`, if it's for sale.
    #[must_use]
    pub fn price(&self) -> Option<Price> {
        self.0.price.map(|p| p.amount().into())
    }

    /// Indicator whether this `Listing` is offered for trade only.
    #[must_use]
    pub fn trade_only(&self) -> bool {
        self.0.trade_only
    }

    /// URLs of this `Listing` images, in their display order.
    #[must_use]
    pub fn images(&self) -> Vec<String> {
        self.0.images.iter().map(ToString::to_string).collect()
    }

    /// Status of this `Listing`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Listing` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Listing`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::listing::Id)]
#[into(domain::listing::Id)]
#[graphql(name = "ListingId", transparent)]
pub struct Id(Uuid);

/// Price of a `Listing` in dollars.
#[derive(Clone, Copy, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "ListingPrice", with = scalar::decimal)]
pub struct Price(Decimal);

/// Category of a `Listing`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingCategory")]
pub enum Category {
    /// Skis.
    Skis,

    /// Snowboards.
    Snowboards,

    /// Ski or snowboard boots.
    Boots,

    /// Bindings.
    Bindings,

    /// Poles.
    Poles,

    /// Helmets.
    Helmets,

    /// Goggles.
    Goggles,

    /// Outerwear and layers.
    Apparel,

    /// Bags, tools, wax and other accessories.
    Accessories,

    /// Anything else.
    Other,
}

impl From<domain::listing::Category> for Category {
    fn from(category: domain::listing::Category) -> Self {
        use domain::listing::Category as C;
        match category {
            C::Skis => Self::Skis,
            C::Snowboards => Self::Snowboards,
            C::Boots => Self::Boots,
            C::Bindings => Self::Bindings,
            C::Poles => Self::Poles,
            C::Helmets => Self::Helmets,
            C::Goggles => Self::Goggles,
            C::Apparel => Self::Apparel,
            C::Accessories => Self::Accessories,
            C::Other => Self::Other,
        }
    }
}

impl From<Category> for domain::listing::Category {
    fn from(category: Category) -> Self {
        use Category as C;
        match category {
            C::Skis => Self::Skis,
            C::Snowboards => Self::Snowboards,
            C::Boots => Self::Boots,
            C::Bindings => Self::Bindings,
            C::Poles => Self::Poles,
            C::Helmets => Self::Helmets,
            C::Goggles => Self::Goggles,
            C::Apparel => Self::Apparel,
            C::Accessories => Self::Accessories,
            C::Other => Self::Other,
        }
    }
}

/// Condition of a `Listing`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingCondition")]
pub enum Condition {
    /// Never used, tags on.
    New,

    /// Used a few days, no visible wear.
    LikeNew,

    /// Normal wear, fully functional.
    Good,

    /// Noticeable wear, functional.
    Fair,

    /// Heavily used.
    Worn,
}

impl From<domain::listing::Condition> for Condition {
    fn from(condition: domain::listing::Condition) -> Self {
        use domain::listing::Condition as C;
        match condition {
            C::New => Self::New,
            C::LikeNew => Self::LikeNew,
            C::Good => Self::Good,
            C::Fair => Self::Fair,
            C::Worn => Self::Worn,
        }
    }
}

impl From<Condition> for domain::listing::Condition {
    fn from(condition: Condition) -> Self {
        use Condition as C;
        match condition {
            C::New => Self::New,
            C::LikeNew => Self::LikeNew,
            C::Good => Self::Good,
            C::Fair => Self::Fair,
            C::Worn => Self::Worn,
        }
    }
}

/// Status of a `Listing`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ListingStatus")]
pub enum Status {
    /// Visible in the marketplace.
    Active,

    /// Sold by the seller.
    Sold,

    /// Hidden by the seller.
    Archived,

    /// Removed by a moderator.
    Removed,
}

impl From<domain::listing::Status> for Status {
    fn from(status: domain::listing::Status) -> Self {
        use domain::listing::Status as S;
        match status {
            S::Active => Self::Active,
            S::Sold => Self::Sold,
            S::Archived => Self::Archived,
            S::Removed => Self::Removed,
        }
    }
}

impl From<Status> for domain::listing::Status {
    fn from(status: Status) -> Self {
        use Status as S;
        match status {
            S::Active => Self::Active,
            S::Sold => Self::Sold,
            S::Archived => Self::Archived,
            S::Removed => Self::Removed,
        }
    }
}

/// Submitted `Listing` form.
///
/// Every field is validated on the server, so the raw input is accepted.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "ListingInput")]
pub struct Input {
    /// Title, 3 to 100 characters.
    pub title: String,

    /// Description, at most 2000 characters.
    pub description: String,

    /// Name of a `ListingCategory`.
    pub category: String,

    /// Name of a `ListingCondition`.
    pub condition: String,

    /// Price in dollars, required unless `tradeOnly`.
    pub price: Option<String>,

    /// Size, at most 50 characters.
    pub size: Option<String>,

    /// Indicator whether the `Listing` is offered for trade only.
    pub trade_only: bool,

    /// URLs of the uploaded images, at most 6.
    pub images: Option<Vec<String>>,
}

impl From<Input> for form::Listing {
    fn from(input: Input) -> Self {
        let Input {
            title,
            description,
            category,
            condition,
            price,
            size,
            trade_only,
            images,
        } = input;
        Self {
            title,
            description,
            category,
            condition,
            price: price.unwrap_or_default(),
            size: size.unwrap_or_default(),
            trade_only,
            images: images.unwrap_or_default(),
        }
    }
}

pub mod list {
    //! Definitions related to the [`Listing`] search.

    use derive_more::{From, Into};
    use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject};
    use service::{read, search};

    use super::{Category, Condition, Listing};
    use crate::Context;

    /// Page of the `Listing` search.
    #[derive(Clone, Debug, From, Into)]
    pub struct Page(read::listing::list::Page);

    /// Page of the `Listing` search.
    #[graphql_object(name = "ListingPage", context = Context)]
    impl Page {
        /// `Listing`s on this `ListingPage`.
        #[must_use]
        pub fn nodes(&self) -> Vec<Listing> {
            self.0.rows.iter().cloned().map(Into::into).collect()
        }

        /// Total number of `Listing`s matching the filter.
        #[must_use]
        pub fn total_count(&self) -> i32 {
            i32::try_from(self.0.total_count).unwrap_or(i32::MAX)
        }

        /// Total number of pages, at least 1.
        #[must_use]
        pub fn total_pages(&self) -> i32 {
            i32::try_from(self.0.total_pages()).unwrap_or(i32::MAX)
        }

        /// Number of this `ListingPage`, starting from 1.
        #[must_use]
        pub fn current_page(&self) -> i32 {
            i32::try_from(self.0.current().get()).unwrap_or(i32::MAX)
        }

        /// Page numbers to render around this `ListingPage`.
        ///
        /// Empty if nothing matches the filter.
        #[must_use]
        pub fn page_window(&self) -> Vec<i32> {
            if self.0.is_empty() {
                return vec![];
            }
            self.0
                .window()
                .filter_map(|n| i32::try_from(n).ok())
                .collect()
        }

        /// Indicator whether nothing matches the filter.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    /// Filter of the `Listing` search.
    ///
    /// Omitted fields don't restrict the search.
    #[derive(Clone, Debug, Default, GraphQLInputObject)]
    #[graphql(name = "ListingFilter")]
    pub struct Filter {
        /// `ListingCategory` to show.
        pub category: Option<Category>,

        /// `ListingCondition` to show.
        pub condition: Option<Condition>,

        /// Text the size should contain.
        pub size: Option<String>,

        /// Text the title or the description should contain.
        pub search: Option<String>,

        /// Lowest price to show. Ignored unless a non-negative number.
        pub price_min: Option<String>,

        /// Highest price to show. Ignored unless a non-negative number.
        pub price_max: Option<String>,

        /// Which `Listing`s to show regarding their trade-only flag.
        pub trade: Option<TradeMode>,

        /// Order to show `Listing`s in.
        pub sort: Option<Sort>,
    }

    impl From<Filter> for search::Filters {
        fn from(filter: Filter) -> Self {
            let Filter {
                category,
                condition,
                size,
                search,
                price_min,
                price_max,
                trade,
                sort,
            } = filter;
            Self {
                category: category.map(Into::into),
                condition: condition.map(Into::into),
                size: size.unwrap_or_default(),
                search: search.unwrap_or_default(),
                price_min: price_min.unwrap_or_default(),
                price_max: price_max.unwrap_or_default(),
                trade: trade.map(Into::into).unwrap_or_default(),
                sort: sort.map(Into::into).unwrap_or_default(),
            }
        }
    }

    /// Which `Listing`s to show regarding their trade-only flag.
    #[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
    #[graphql(name = "ListingTradeMode")]
    pub enum TradeMode {
        /// Any `Listing`.
        All,

        /// Trade-only `Listing`s.
        Trade,

        /// `Listing`s for sale.
        Sale,
    }

    impl From<TradeMode> for search::TradeMode {
        fn from(mode: TradeMode) -> Self {
            match mode {
                TradeMode::All => Self::All,
                TradeMode::Trade => Self::Trade,
                TradeMode::Sale => Self::Sale,
            }
        }
    }

    /// Order of the `Listing` search.
    #[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
    #[graphql(name = "ListingSort")]
    pub enum Sort {
        /// Most recently created first.
        Newest,

        /// Least recently created first.
        Oldest,

        /// Cheapest first, `Listing`s without a price last.
        PriceLow,

        /// Most expensive first, `Listing`s without a price last.
        PriceHigh,
    }

    impl From<Sort> for read::listing::list::Sort {
        fn from(sort: Sort) -> Self {
            match sort {
                Sort::Newest => Self::Newest,
                Sort::Oldest => Self::Oldest,
                Sort::PriceLow => Self::PriceLow,
                Sort::PriceHigh => Self::PriceHigh,
            }
        }
    }
}
