//! In-memory [`Database`] implementation.

use std::{
    cmp::Ordering,
    collections::HashMap,
    future,
    sync::{
        atomic::{self, AtomicBool, AtomicUsize},
        Arc, Mutex, MutexGuard,
    },
};

use common::operations::{By, Insert, Select, Start, Subscribe, Update};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        enrollment, listing, message, profile, user, Enrollment, Listing,
        Message, Profile,
    },
    infra::{database, Database, Feed},
    read::{
        self,
        listing::list::{Filter, Sort},
        message::{Change, ChangeKind},
    },
};

/// In-memory [`Database`].
///
/// Keeps everything in the process memory and publishes [`Message`] changes
/// right into its [`Feed`]. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored entities.
    storage: Arc<Mutex<Storage>>,

    /// [`Feed`] of [`Message`] changes.
    feed: Feed,

    /// Indicator whether this [`Memory`] refuses to serve operations.
    unavailable: Arc<AtomicBool>,

    /// Number of served [`Select`] operations.
    selects: Arc<AtomicUsize>,
}

/// Entities stored in a [`Memory`].
#[derive(Debug, Default)]
struct Storage {
    /// Stored [`Listing`]s.
    listings: HashMap<listing::Id, Listing>,

    /// Stored [`Message`]s.
    messages: HashMap<message::Id, Message>,

    /// Stored [`Profile`]s of their users.
    profiles: HashMap<user::Id, Profile>,

    /// Stored [`Enrollment`]s.
    enrollments: HashMap<enrollment::Id, Enrollment>,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following operation of this [`Memory`] fail with
    /// [`Error::Unavailable`] (or serve again once `unavailable` is `false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, atomic::Ordering::SeqCst);
    }

    /// Returns the number of [`Select`] operations served so far.
    #[must_use]
    pub fn selects(&self) -> usize {
        self.selects.load(atomic::Ordering::SeqCst)
    }

    /// Returns [`Feed`] of this [`Memory`].
    #[must_use]
    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    /// Locks the [`Storage`], unless this [`Memory`] is unavailable.
    fn storage(
        &self,
    ) -> Result<MutexGuard<'_, Storage>, Traced<database::Error>> {
        if self.unavailable.load(atomic::Ordering::SeqCst) {
            return Err(tracerr::new!(database::Error::from(
                Error::Unavailable
            )));
        }
        self.storage
            .lock()
            .map_err(|_| tracerr::new!(database::Error::from(Error::Poisoned)))
    }

    /// Locks the [`Storage`] for serving a [`Select`] operation.
    fn storage_for_select(
        &self,
    ) -> Result<MutexGuard<'_, Storage>, Traced<database::Error>> {
        let storage = self.storage().map_err(tracerr::wrap!())?;
        _ = self.selects.fetch_add(1, atomic::Ordering::SeqCst);
        Ok(storage)
    }
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Memory`] was made unavailable.
    #[display("`Memory` database is unavailable")]
    Unavailable,

    /// [`Memory`] storage was poisoned by a panic.
    #[display("`Memory` database storage is poisoned")]
    Poisoned,
}

impl
    Database<
        Select<By<read::listing::list::Page, read::listing::list::Selector>>,
    > for Memory
{
    type Ok = read::listing::list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<read::listing::list::Page, read::listing::list::Selector>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let read::listing::list::Selector {
            arguments,
            filter,
            order,
        } = by.into_inner();

        let storage = self.storage_for_select().map_err(tracerr::wrap!())?;
        let mut matched = storage
            .listings
            .values()
            .filter(|l| matches(&filter, l))
            .collect::<Vec<_>>();
        matched.sort_by(|a, b| compare(order, a, b));

        let total_count = matched.len();
        Ok(read::listing::list::Page::new(
            arguments,
            matched.into_iter().skip(arguments.offset()).cloned(),
            total_count,
        ))
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .listings
            .get(&id)
            .cloned())
    }
}

impl Database<Insert<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(listing)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.storage()
                .map_err(tracerr::wrap!())?
                .listings
                .insert(listing.id, listing),
        );
        Ok(())
    }
}

impl Database<Select<By<Option<Message>, message::Id>>> for Memory {
    type Ok = Option<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Message>, message::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .messages
            .get(&id)
            .cloned())
    }
}

impl Database<Insert<Message>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(msg): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(msg)).await.map_err(tracerr::wrap!())
    }
}

impl Database<Update<Message>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(msg): Update<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let change = {
            let mut storage = self.storage().map_err(tracerr::wrap!())?;
            let kind = if storage.messages.contains_key(&msg.id) {
                ChangeKind::Update
            } else {
                ChangeKind::Insert
            };
            let change = Change::of(kind, &msg);
            drop(storage.messages.insert(msg.id, msg));
            change
        };
        self.feed.publish(change);
        Ok(())
    }
}

impl Database<Select<By<read::message::unread::Count, user::Id>>> for Memory {
    type Ok = read::message::unread::Count;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::message::unread::Count, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let receiver = by.into_inner();
        let count = self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .messages
            .values()
            .filter(|m| m.receiver_id == receiver && !m.read)
            .count();
        Ok(i32::try_from(count).unwrap_or(i32::MAX).into())
    }
}

impl Database<Subscribe<By<read::message::Changes, user::Id>>> for Memory {
    type Ok = read::message::Changes;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Subscribe(by): Subscribe<By<read::message::Changes, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.storage().map_err(tracerr::wrap!())?);
        Ok(self.feed.subscribe(by.into_inner()))
    }
}

impl Database<Start<By<read::message::Changes, ()>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    /// Never resolves, as [`Memory`] publishes its [`Change`]s directly.
    async fn execute(
        &self,
        _: Start<By<read::message::Changes, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        future::pending().await
    }
}

impl Database<Select<By<Option<Profile>, user::Id>>> for Memory {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();
        Ok(self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .profiles
            .get(&user_id)
            .cloned())
    }
}

impl Database<Select<By<Option<Profile>, profile::Username>>> for Memory {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, profile::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        Ok(self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .profiles
            .values()
            .find(|p| p.username.is_same(&username))
            .cloned())
    }
}

impl Database<Update<Profile>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(profile): Update<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.storage()
                .map_err(tracerr::wrap!())?
                .profiles
                .insert(profile.user_id, profile),
        );
        Ok(())
    }
}

impl Database<Select<By<Vec<Enrollment>, user::Id>>> for Memory {
    type Ok = Vec<Enrollment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Enrollment>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let parent_id = by.into_inner();
        let mut enrollments = self
            .storage_for_select()
            .map_err(tracerr::wrap!())?
            .enrollments
            .values()
            .filter(|e| e.parent_id == parent_id)
            .cloned()
            .collect::<Vec<_>>();
        enrollments.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id))
        });
        Ok(enrollments)
    }
}

impl Database<Insert<Enrollment>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(enrollment): Insert<Enrollment>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.storage()
                .map_err(tracerr::wrap!())?
                .enrollments
                .insert(enrollment.id, enrollment),
        );
        Ok(())
    }
}

/// Checks whether the provided [`Listing`] satisfies the [`Filter`].
fn matches(filter: &Filter, listing: &Listing) -> bool {
    let Filter {
        category,
        condition,
        size,
        search,
        trade_only,
        price,
    } = filter;

    listing.status == listing::Status::Active
        && category.map_or(true, |c| listing.category == c)
        && condition.map_or(true, |c| listing.condition == c)
        && size.as_ref().map_or(true, |s| {
            listing
                .size
                .as_ref()
                .is_some_and(|size| s.is_in(size.as_ref()))
        })
        && search.as_ref().map_or(true, |s| {
            s.is_in(listing.title.as_ref())
                || s.is_in(listing.description.as_ref())
        })
        && trade_only.map_or(true, |t| listing.trade_only == t)
        && price.contains(listing.price)
}

/// Compares the provided [`Listing`]s according to the [`Sort`] order.
fn compare(sort: Sort, a: &Listing, b: &Listing) -> Ordering {
    /// Compares prices placing absent ones last.
    fn nulls_last(
        a: Option<listing::Price>,
        b: Option<listing::Price>,
        cmp: impl FnOnce(listing::Price, listing::Price) -> Ordering,
    ) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => cmp(a, b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    match sort {
        Sort::Newest => b.created_at.cmp(&a.created_at),
        Sort::Oldest => a.created_at.cmp(&b.created_at),
        Sort::PriceLow => nulls_last(a.price, b.price, |a, b| a.cmp(&b)),
        Sort::PriceHigh => nulls_last(a.price, b.price, |a, b| b.cmp(&a)),
    }
    .then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
pub(crate) mod spec {
    use std::num::NonZeroU32;

    use common::{
        operations::{By, Insert, Select, Update},
        pagination::Number,
        Handler as _,
    };
    use rust_decimal::Decimal;

    use crate::{
        domain::{listing, user, Listing},
        read::listing::list::{
            Arguments, Filter, Page, PriceRange, Selector, Sort, Substring,
        },
    };

    use super::Memory;

    pub(crate) fn listing(
        title: &str,
        category: listing::Category,
        price: Option<i64>,
    ) -> Listing {
        Listing {
            id: listing::Id::new(),
            seller_id: user::Id::new(),
            title: listing::Title::new(title).unwrap(),
            description: listing::Description::new("Well kept.").unwrap(),
            category,
            condition: listing::Condition::Good,
            size: None,
            price: price
                .map(|p| listing::Price::new(Decimal::new(p, 0)).unwrap()),
            trade_only: price.is_none(),
            images: vec![],
            status: listing::Status::Active,
            created_at: listing::CreationDateTime::now(),
        }
    }

    fn selector(page: u32, filter: Filter, order: Sort) -> Selector {
        Selector {
            arguments: Arguments::new(
                Number::new(page).unwrap(),
                NonZeroU32::new(2).unwrap(),
            ),
            filter,
            order,
        }
    }

    async fn select(db: &Memory, selector: Selector) -> Page {
        db.execute(Select(By::<Page, _>::new(selector))).await.unwrap()
    }

    #[tokio::test]
    async fn returns_rows_with_total_count() {
        let db = Memory::new();
        for n in 0..5 {
            let title = format!("Skis {n}");
            let l = listing(&title, listing::Category::Skis, Some(100));
            db.execute(Insert(l)).await.unwrap();
        }
        db.execute(Insert(listing("Boots", listing::Category::Boots, Some(1))))
            .await
            .unwrap();

        let filter = Filter {
            category: Some(listing::Category::Skis),
            ..Filter::default()
        };
        let page = select(&db, selector(3, filter, Sort::Newest)).await;

        assert_eq!(page.total_count, 5);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.total_pages(), 3);
        assert_eq!(db.selects(), 1);
    }

    #[tokio::test]
    async fn skips_inactive_listings() {
        let db = Memory::new();
        let mut sold = listing("Sold skis", listing::Category::Skis, Some(10));
        sold.status = listing::Status::Sold;
        db.execute(Insert(sold)).await.unwrap();

        let page =
            select(&db, selector(1, Filter::default(), Sort::Newest)).await;

        assert!(page.is_empty());
        assert!(page.rows.is_empty());
    }

    #[tokio::test]
    async fn filters_by_text_and_price() {
        let db = Memory::new();
        let skis = listing::Category::Skis;
        let cheap = listing("Rossignol Experience", skis, Some(40));
        let fit = listing("Rossignol Hero", skis, Some(150));
        let trade = listing("Rossignol Soul", skis, None);
        for l in [cheap, fit.clone(), trade] {
            db.execute(Insert(l)).await.unwrap();
        }

        let filter = Filter {
            search: Substring::new("  rossignol "),
            price: PriceRange {
                min: Some(Decimal::new(50, 0)),
                max: Some(Decimal::new(200, 0)),
            },
            ..Filter::default()
        };
        let page = select(&db, selector(1, filter, Sort::Newest)).await;

        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows, vec![fit]);
    }

    #[tokio::test]
    async fn sorts_by_price_with_absent_last() {
        let db = Memory::new();
        let free = listing("Trade poles", listing::Category::Poles, None);
        let low = listing("Cheap poles", listing::Category::Poles, Some(5));
        let high = listing("Carbon poles", listing::Category::Poles, Some(90));
        for l in [&free, &low, &high] {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let asc = |page| selector(page, Filter::default(), Sort::PriceLow);
        let desc = |page| selector(page, Filter::default(), Sort::PriceHigh);

        let page = select(&db, asc(1)).await;
        assert_eq!(page.rows, vec![low.clone(), high.clone()]);
        let page = select(&db, asc(2)).await;
        assert_eq!(page.rows, vec![free]);

        let desc = select(&db, desc(1)).await;
        assert_eq!(desc.rows, vec![high, low]);
    }

    #[tokio::test]
    async fn filters_by_size_ignoring_case() {
        let db = Memory::new();
        let mut long = listing("Long skis", listing::Category::Skis, Some(90));
        long.size = listing::Size::new("184 cm");
        let mut short = listing("Kid skis", listing::Category::Skis, Some(40));
        short.size = listing::Size::new("120 CM");
        let no_size = listing("Skis", listing::Category::Skis, Some(60));
        for l in [&long, &short, &no_size] {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let by_size = |text| Filter {
            size: Substring::new(text),
            ..Filter::default()
        };

        let page = select(&db, selector(1, by_size("184"), Sort::Newest)).await;
        assert_eq!(page.rows, vec![long]);

        let page = select(&db, selector(1, by_size("cm"), Sort::Oldest)).await;
        assert_eq!(page.total_count, 2);
        assert!(!page.rows.contains(&no_size));
    }

    #[tokio::test]
    async fn filters_by_trade_mode() {
        let db = Memory::new();
        let sale = listing("Skis for sale", listing::Category::Skis, Some(90));
        let trade = listing("Skis for trade", listing::Category::Skis, None);
        for l in [&sale, &trade] {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let by_trade = |trade_only| Filter {
            trade_only: Some(trade_only),
            ..Filter::default()
        };

        let page = select(&db, selector(1, by_trade(true), Sort::Newest)).await;
        assert_eq!(page.rows, vec![trade]);

        let page =
            select(&db, selector(1, by_trade(false), Sort::Newest)).await;
        assert_eq!(page.rows, vec![sale]);
    }

    #[tokio::test]
    async fn filters_by_condition() {
        let db = Memory::new();
        let mut fresh = listing("New boots", listing::Category::Boots, Some(9));
        fresh.condition = listing::Condition::New;
        let used = listing("Used boots", listing::Category::Boots, Some(5));
        for l in [&fresh, &used] {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let filter = Filter {
            condition: Some(listing::Condition::New),
            ..Filter::default()
        };
        let page = select(&db, selector(1, filter, Sort::Newest)).await;

        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows, vec![fresh]);
    }

    #[tokio::test]
    async fn searches_description_too() {
        let db = Memory::new();
        let mut waxed =
            listing("Freeride skis", listing::Category::Skis, Some(300));
        waxed.description =
            listing::Description::new("Freshly WAXED, new edges.").unwrap();
        let plain = listing("Waxless skis", listing::Category::Skis, Some(80));
        let other = listing("Race skis", listing::Category::Skis, Some(500));
        for l in [&waxed, &plain, &other] {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let filter = Filter {
            search: Substring::new("waxed"),
            ..Filter::default()
        };
        let page = select(&db, selector(1, filter, Sort::Newest)).await;

        assert_eq!(page.rows, vec![waxed]);
    }

    #[tokio::test]
    async fn sorts_by_creation() {
        let db = Memory::new();
        let mut listings = (0..3)
            .map(|n| {
                let mut l = listing(
                    &format!("Poles {n}"),
                    listing::Category::Poles,
                    Some(10),
                );
                l.created_at =
                    listing::CreationDateTime::from_unix_timestamp(1_000 + n)
                        .unwrap();
                l
            })
            .collect::<Vec<_>>();
        for l in &listings {
            db.execute(Insert(l.clone())).await.unwrap();
        }

        let oldest = select(&db, selector(1, Filter::default(), Sort::Oldest));
        assert_eq!(oldest.await.rows, listings[..2]);

        listings.reverse();
        let newest = select(&db, selector(1, Filter::default(), Sort::Newest));
        assert_eq!(newest.await.rows, listings[..2]);
    }

    #[tokio::test]
    async fn same_selector_yields_same_page() {
        let db = Memory::new();
        for n in 0..7 {
            let title = format!("Helmet {n}");
            let l = listing(&title, listing::Category::Helmets, Some(30));
            db.execute(Insert(l)).await.unwrap();
        }

        let same = || selector(2, Filter::default(), Sort::PriceLow);
        let first = select(&db, same()).await;
        let second = select(&db, same()).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fails_when_unavailable() {
        let db = Memory::new();
        db.set_unavailable(true);

        let res = db
            .execute(Select(By::<Page, _>::new(selector(
                1,
                Filter::default(),
                Sort::Newest,
            ))))
            .await;
        assert!(res.is_err());

        db.set_unavailable(false);
        let l = listing("Goggles", listing::Category::Goggles, Some(20));
        assert!(db.execute(Update(l)).await.is_ok());
    }
}
