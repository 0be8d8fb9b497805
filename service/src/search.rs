//! Listing search driven by user-edited [`Filters`].
//!
//! The [`Engine`] is a pure state machine: every user action returns a
//! [`Request`] to execute, and its result is fed back via
//! [`Engine::complete()`]. The [`Searcher`] glues an [`Engine`] to a
//! [`Query`] executor.

use std::{
    cell::{Ref, RefCell},
    fmt,
    ops::RangeInclusive,
    str::FromStr as _,
};

use common::pagination::Number;
use rust_decimal::Decimal;
use smart_default::SmartDefault;
use tracing as log;

use crate::{
    domain::listing,
    query,
    read::listing::list::{
        Arguments, Filter, Page, PriceRange, Selector, Sort, Substring,
        PAGE_SIZE,
    },
    Query,
};
#[cfg(doc)]
use crate::domain::Listing;

/// Which [`Listing`]s to show regarding their [`Listing::trade_only`] flag.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, SmartDefault)]
pub enum TradeMode {
    /// Any [`Listing`].
    #[default]
    All,

    /// Trade-only [`Listing`]s.
    Trade,

    /// [`Listing`]s for sale.
    Sale,
}

impl TradeMode {
    /// Returns the required [`Listing::trade_only`] value, if any.
    #[must_use]
    pub const fn trade_only(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Trade => Some(true),
            Self::Sale => Some(false),
        }
    }
}

/// Search filters as edited by a user.
///
/// Text fields are kept raw, exactly as typed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Filters {
    /// [`listing::Category`] to show, or all of them if [`None`].
    pub category: Option<listing::Category>,

    /// [`listing::Condition`] to show, or all of them if [`None`].
    pub condition: Option<listing::Condition>,

    /// Text the [`listing::Size`] should contain.
    pub size: String,

    /// Text the title or the description should contain.
    pub search: String,

    /// Lowest price to show.
    pub price_min: String,

    /// Highest price to show.
    pub price_max: String,

    /// [`TradeMode`] to show.
    pub trade: TradeMode,

    /// Order to show in.
    pub sort: Sort,
}

impl Filters {
    /// Applies the provided [`Change`] to these [`Filters`].
    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Category(c) => self.category = c,
            Change::Condition(c) => self.condition = c,
            Change::Size(s) => self.size = s,
            Change::Search(s) => self.search = s,
            Change::PriceMin(p) => self.price_min = p,
            Change::PriceMax(p) => self.price_max = p,
            Change::Trade(t) => self.trade = t,
            Change::Sort(s) => self.sort = s,
        }
    }

    /// Builds the [`Filter`] predicates these [`Filters`] describe.
    ///
    /// Blank texts are omitted, and so are price bounds not being
    /// non-negative numbers.
    #[must_use]
    pub fn filter(&self) -> Filter {
        Filter {
            category: self.category,
            condition: self.condition,
            size: Substring::new(&self.size),
            search: Substring::new(&self.search),
            trade_only: self.trade.trade_only(),
            price: PriceRange {
                min: price_bound(&self.price_min),
                max: price_bound(&self.price_max),
            },
        }
    }

    /// Builds the [`Selector`] of the provided `page` with these
    /// [`Filters`].
    #[must_use]
    pub fn selector(&self, page: Number) -> Selector {
        Selector {
            arguments: Arguments::new(page, PAGE_SIZE),
            filter: self.filter(),
            order: self.sort,
        }
    }
}

/// Parses a price bound out of the provided `input`.
fn price_bound(input: &str) -> Option<Decimal> {
    Decimal::from_str(input.trim())
        .ok()
        .filter(|d| !d.is_sign_negative())
}

/// Change of a single [`Filters`] field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Change {
    /// [`Filters::category`] change.
    Category(Option<listing::Category>),

    /// [`Filters::condition`] change.
    Condition(Option<listing::Condition>),

    /// [`Filters::size`] change.
    Size(String),

    /// [`Filters::search`] change.
    Search(String),

    /// [`Filters::price_min`] change.
    PriceMin(String),

    /// [`Filters::price_max`] change.
    PriceMax(String),

    /// [`Filters::trade`] change.
    Trade(TradeMode),

    /// [`Filters::sort`] change.
    Sort(Sort),
}

/// State of an [`Engine`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// The latest [`Request`] is in flight.
    Loading,

    /// The latest [`Request`] succeeded.
    Idle {
        /// Indicator whether any [`Listing`] is shown.
        has_data: bool,
    },

    /// The latest [`Request`] failed.
    Error,
}

/// Sequence number of a [`Request`] issued by an [`Engine`].
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Generation(u64);

impl Generation {
    /// Returns the [`Generation`] following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// [`Selector`] to execute on behalf of an [`Engine`].
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    /// [`Generation`] of this [`Request`].
    pub generation: Generation,

    /// [`Selector`] to execute.
    pub selector: Selector,
}

/// Outcome of [`Engine::complete()`].
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    /// Result was applied, possibly requiring a follow-up [`Request`].
    Applied(Option<Request>),

    /// Result belongs to an outdated [`Request`] and was discarded.
    Stale,
}

/// State machine of a listing search.
#[derive(Clone, Debug)]
pub struct Engine {
    /// Current [`Filters`].
    filters: Filters,

    /// Current page.
    page: Number,

    /// Current [`State`].
    state: State,

    /// [`Generation`] of the latest issued [`Request`].
    generation: Generation,

    /// [`Page`] shown to the user.
    shown: Option<Page>,
}

impl Engine {
    /// Creates a new [`Engine`] with the default [`Filters`], along with the
    /// initial [`Request`] to execute.
    #[must_use]
    pub fn new() -> (Self, Request) {
        let mut this = Self {
            filters: Filters::default(),
            page: Number::FIRST,
            state: State::Loading,
            generation: Generation::default(),
            shown: None,
        };
        let req = this.issue();
        (this, req)
    }

    /// Returns the current [`Filters`].
    #[must_use]
    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    /// Returns the current page.
    #[must_use]
    pub fn page(&self) -> Number {
        self.page
    }

    /// Returns the current [`State`].
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the shown [`Page`], if any.
    #[must_use]
    pub fn shown(&self) -> Option<&Page> {
        self.shown.as_ref()
    }

    /// Returns the total number of matching [`Listing`]s, if known.
    #[must_use]
    pub fn total_count(&self) -> Option<usize> {
        self.shown.as_ref().map(|p| p.total_count)
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.shown.as_ref().map_or(1, Page::total_pages)
    }

    /// Indicates whether nothing matches the current [`Filters`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state == State::Idle { has_data: false }
            && self.total_count() == Some(0)
    }

    /// Returns the page numbers to render.
    ///
    /// [`None`] if there is nothing to paginate.
    #[must_use]
    pub fn window(&self) -> Option<RangeInclusive<u32>> {
        self.shown
            .as_ref()
            .filter(|p| !p.is_empty())
            .map(|_| common::pagination::window(self.page, self.total_pages()))
    }

    /// Applies the provided [`Change`], returning to the first page.
    pub fn change(&mut self, change: Change) -> Request {
        self.filters.apply(change);
        self.page = Number::FIRST;
        self.issue()
    }

    /// Goes to the provided `page` keeping the [`Filters`].
    pub fn go_to(&mut self, page: Number) -> Request {
        self.page = page;
        self.issue()
    }

    /// Resets all the [`Filters`] to their defaults, returning to the first
    /// page.
    pub fn clear(&mut self) -> Request {
        self.filters = Filters::default();
        self.page = Number::FIRST;
        self.issue()
    }

    /// Re-issues the [`Request`] of the current page and [`Filters`].
    pub fn refresh(&mut self) -> Request {
        self.issue()
    }

    /// Applies the `result` of the [`Request`] with the provided
    /// `generation`.
    ///
    /// If the current page turns out to be beyond the last one, it's clamped
    /// and a follow-up [`Request`] is returned.
    pub fn complete<E: fmt::Display>(
        &mut self,
        generation: Generation,
        result: Result<Page, E>,
    ) -> Outcome {
        if generation != self.generation {
            log::debug!("discarding stale search result {generation:?}");
            return Outcome::Stale;
        }

        match result {
            Ok(page) => {
                let last = page.total_pages();
                if self.page.get() > last {
                    self.page = self.page.clamp_to(last);
                    return Outcome::Applied(Some(self.issue()));
                }
                self.state = State::Idle {
                    has_data: !page.rows.is_empty(),
                };
                self.shown = Some(page);
            }
            Err(e) => {
                log::warn!("listing search failed: {e}");
                self.state = State::Error;
                self.shown = None;
            }
        }
        Outcome::Applied(None)
    }

    /// Issues a new [`Request`] of the current page and [`Filters`].
    fn issue(&mut self) -> Request {
        self.generation = self.generation.next();
        self.state = State::Loading;
        Request {
            generation: self.generation,
            selector: self.filters.selector(self.page),
        }
    }
}

/// Listing search executing [`Engine`] requests via a [`Query`] executor.
///
/// Meant for a single-threaded event loop: the [`Engine`] is never borrowed
/// across an `.await` point, so the actions may interleave freely, and only
/// the latest one takes effect.
#[derive(Debug)]
pub struct Searcher<S> {
    /// [`Query`] executor.
    service: S,

    /// Driven [`Engine`].
    engine: RefCell<Engine>,
}

impl<S> Searcher<S>
where
    S: Query<query::listings::Search, Ok = Page, Err: fmt::Display>,
{
    /// Creates a new [`Searcher`] with the default [`Filters`] and performs
    /// the initial search.
    pub async fn new(service: S) -> Self {
        let (engine, req) = Engine::new();
        let this = Self {
            service,
            engine: RefCell::new(engine),
        };
        this.run(req).await;
        this
    }

    /// Returns the driven [`Engine`].
    ///
    /// # Panics
    ///
    /// If called while an [`Engine`] transition is in progress, which never
    /// happens on a single thread.
    pub fn engine(&self) -> Ref<'_, Engine> {
        self.engine.borrow()
    }

    /// Applies the provided [`Change`] and searches again.
    pub async fn change(&self, change: Change) {
        let req = self.engine.borrow_mut().change(change);
        self.run(req).await;
    }

    /// Goes to the provided `page`.
    pub async fn go_to(&self, page: Number) {
        let req = self.engine.borrow_mut().go_to(page);
        self.run(req).await;
    }

    /// Resets the [`Filters`] and searches again.
    pub async fn clear(&self) {
        let req = self.engine.borrow_mut().clear();
        self.run(req).await;
    }

    /// Searches again with the current [`Filters`].
    pub async fn refresh(&self) {
        let req = self.engine.borrow_mut().refresh();
        self.run(req).await;
    }

    /// Executes the provided [`Request`] and its follow-ups.
    async fn run(&self, mut req: Request) {
        loop {
            let result = self
                .service
                .execute(query::listings::Search::by(req.selector.clone()))
                .await;
            let outcome =
                self.engine.borrow_mut().complete(req.generation, result);
            match outcome {
                Outcome::Applied(Some(next)) => req = next,
                Outcome::Applied(None) | Outcome::Stale => break,
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, pagination::Number, Handler as _};
    use rust_decimal::Decimal;

    use crate::{
        domain::listing,
        infra::{database::memory::spec::listing, Memory},
        read::listing::list::{Page, PriceRange, Sort, Substring},
        Service,
    };

    use super::{Change, Engine, Outcome, Searcher, State, TradeMode};

    fn service(db: &Memory) -> Service<Memory> {
        Service::new(crate::spec::config(b"secret"), db.clone()).0
    }

    async fn seed_skis(db: &Memory) {
        for n in 0..37 {
            let l = listing(
                &format!("Skis #{n}"),
                listing::Category::Skis,
                Some(50 + n * 4),
            );
            db.execute(Insert(l)).await.unwrap();
        }
        for price in [10, 250, 999] {
            let l =
                listing("Pricey skis", listing::Category::Skis, Some(price));
            db.execute(Insert(l)).await.unwrap();
        }
        for _ in 0..3 {
            let l = listing("Boots", listing::Category::Boots, Some(100));
            db.execute(Insert(l)).await.unwrap();
        }
    }

    fn page(n: u32) -> Number {
        Number::new(n).unwrap()
    }

    #[test]
    fn builds_selector_of_filters() {
        let (mut engine, _) = Engine::new();
        _ = engine.change(Change::Category(Some(listing::Category::Skis)));
        _ = engine.change(Change::PriceMin("50".into()));
        let req = engine.change(Change::PriceMax("200".into()));

        assert_eq!(req.selector.arguments.offset(), 0);
        assert_eq!(req.selector.arguments.limit(), 12);
        assert_eq!(
            req.selector.filter.category,
            Some(listing::Category::Skis),
        );
        assert_eq!(
            req.selector.filter.price,
            PriceRange {
                min: Some(Decimal::new(50, 0)),
                max: Some(Decimal::new(200, 0)),
            },
        );
    }

    #[test]
    fn skips_invalid_price_bounds() {
        let (mut engine, _) = Engine::new();
        _ = engine.change(Change::PriceMin("-5".into()));
        let req = engine.change(Change::PriceMax("lots".into()));

        assert_eq!(req.selector.filter.price, PriceRange::default());
    }

    #[test]
    fn resets_page_on_filter_change() {
        let (mut engine, _) = Engine::new();
        let req = engine.go_to(page(3));
        assert_eq!(req.selector.arguments.page, page(3));

        let req = engine.change(Change::Search("atomic".into()));
        assert_eq!(engine.page(), Number::FIRST);
        assert_eq!(req.selector.arguments.page, Number::FIRST);
    }

    #[test]
    fn resets_page_on_every_filter_kind() {
        let changes = [
            Change::Trade(TradeMode::Trade),
            Change::Size("42".into()),
            Change::Condition(Some(listing::Condition::LikeNew)),
            Change::Sort(Sort::Oldest),
        ];
        for change in changes {
            let (mut engine, _) = Engine::new();
            _ = engine.go_to(page(4));

            let req = engine.change(change.clone());

            assert_eq!(engine.page(), Number::FIRST, "{change:?}");
            assert_eq!(req.selector.arguments.page, Number::FIRST);
        }
    }

    #[test]
    fn maps_trade_and_size_into_selector() {
        let (mut engine, _) = Engine::new();
        _ = engine.change(Change::Trade(TradeMode::Sale));
        let req = engine.change(Change::Size("  27.5 ".into()));

        assert_eq!(req.selector.filter.trade_only, Some(false));
        assert_eq!(req.selector.filter.size, Substring::new("27.5"));

        let req = engine.change(Change::Trade(TradeMode::All));
        assert_eq!(req.selector.filter.trade_only, None);
    }

    #[test]
    fn keeps_filters_on_page_change() {
        let (mut engine, _) = Engine::new();
        _ = engine.change(Change::Sort(Sort::PriceHigh));
        let req = engine.go_to(page(2));

        assert_eq!(req.selector.order, Sort::PriceHigh);
        assert_eq!(engine.filters().sort, Sort::PriceHigh);
    }

    #[test]
    fn discards_stale_results() {
        let (mut engine, first) = Engine::new();
        let second = engine.change(Change::Search("old".into()));
        let third = engine.change(Change::Search("new".into()));

        let empty = |req: &super::Request| {
            Ok::<_, &str>(Page::new(req.selector.arguments, vec![], 0))
        };
        assert_eq!(
            engine.complete(first.generation, empty(&first)),
            Outcome::Stale,
        );
        assert_eq!(
            engine.complete(second.generation, empty(&second)),
            Outcome::Stale,
        );
        assert_eq!(engine.state(), State::Loading);

        assert_eq!(
            engine.complete(third.generation, empty(&third)),
            Outcome::Applied(None),
        );
        assert_eq!(engine.state(), State::Idle { has_data: false });
        assert!(engine.is_empty());
        assert_eq!(engine.window(), None);
    }

    #[test]
    fn drops_shown_page_on_error() {
        let (mut engine, req) = Engine::new();
        let rows = vec![listing("Skis", listing::Category::Skis, Some(1))];
        _ = engine.complete(
            req.generation,
            Ok::<_, &str>(Page::new(req.selector.arguments, rows, 1)),
        );
        assert_eq!(engine.state(), State::Idle { has_data: true });

        let req = engine.change(Change::Search("skis".into()));
        _ = engine.complete(req.generation, Err::<Page, _>("timeout"));

        assert_eq!(engine.state(), State::Error);
        assert!(engine.shown().is_none());
        assert!(!engine.is_empty());
        assert_eq!(engine.filters().search, "skis");
    }

    #[test]
    fn clamps_page_beyond_last() {
        let (mut engine, _) = Engine::new();
        let req = engine.go_to(page(9));

        let outcome = engine.complete(
            req.generation,
            Ok::<_, &str>(Page::new(req.selector.arguments, vec![], 37)),
        );

        let Outcome::Applied(Some(next)) = outcome else {
            panic!("expected follow-up request, got: {outcome:?}");
        };
        assert_eq!(engine.page(), page(4));
        assert_eq!(next.selector.arguments.page, page(4));
        assert_eq!(engine.state(), State::Loading);
    }

    #[tokio::test]
    async fn searches_skis_by_price() {
        let db = Memory::new();
        seed_skis(&db).await;
        let searcher = Searcher::new(service(&db)).await;
        assert_eq!(searcher.engine().total_count(), Some(43));

        searcher
            .change(Change::Category(Some(listing::Category::Skis)))
            .await;
        searcher.change(Change::PriceMin("50".into())).await;
        searcher.change(Change::PriceMax("200".into())).await;

        let engine = searcher.engine();
        assert_eq!(engine.state(), State::Idle { has_data: true });
        assert_eq!(engine.page(), Number::FIRST);
        assert_eq!(engine.total_count(), Some(37));
        assert_eq!(engine.total_pages(), 4);
        assert_eq!(engine.window(), Some(1..=4));
        assert_eq!(engine.shown().map(|p| p.rows.len()), Some(12));
    }

    #[tokio::test]
    async fn clears_filters() {
        let db = Memory::new();
        seed_skis(&db).await;
        let searcher = Searcher::new(service(&db)).await;

        searcher
            .change(Change::Category(Some(listing::Category::Boots)))
            .await;
        searcher.change(Change::Sort(Sort::PriceLow)).await;
        searcher.go_to(page(1)).await;
        assert_eq!(searcher.engine().total_count(), Some(3));

        searcher.clear().await;

        let engine = searcher.engine();
        assert_eq!(*engine.filters(), super::Filters::default());
        assert_eq!(engine.page(), Number::FIRST);
        assert_eq!(engine.total_count(), Some(43));
    }

    #[tokio::test]
    async fn recovers_after_outage() {
        let db = Memory::new();
        seed_skis(&db).await;
        let searcher = Searcher::new(service(&db)).await;

        db.set_unavailable(true);
        searcher.go_to(page(2)).await;
        assert_eq!(searcher.engine().state(), State::Error);
        assert_eq!(searcher.engine().page(), page(2));

        db.set_unavailable(false);
        searcher.refresh().await;
        assert_eq!(searcher.engine().state(), State::Idle { has_data: true });
        assert_eq!(searcher.engine().window(), Some(1..=4));
    }
}
