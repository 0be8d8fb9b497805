//! Abstractions for offset pagination.

use std::{num::NonZeroU32, ops::RangeInclusive};

use derive_more::Display;

/// Maximum number of page numbers rendered in a [`window()`].
pub const WINDOW_WIDTH: u32 = 5;

/// Number of a page, starting from `1`.
#[derive(
    Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
)]
pub struct Number(NonZeroU32);

impl Number {
    /// The first page.
    pub const FIRST: Self = Self(NonZeroU32::MIN);

    /// Creates a new [`Number`] if the given `num` is positive.
    #[must_use]
    pub const fn new(num: u32) -> Option<Self> {
        match NonZeroU32::new(num) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Returns the raw value of this [`Number`].
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Clamps this [`Number`] into the `[1, total_pages]` range.
    #[must_use]
    pub fn clamp_to(self, total_pages: u32) -> Self {
        Self::new(self.get().min(total_pages)).unwrap_or(Self::FIRST)
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<i32> for Number {
    type Error = &'static str;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or("page number must be positive")
    }
}

/// Pagination arguments.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Arguments {
    /// Requested page.
    pub page: Number,

    /// Maximum number of items on a page.
    pub size: NonZeroU32,
}

impl Arguments {
    /// Creates new [`Arguments`] requesting the given `page`.
    #[must_use]
    pub const fn new(page: Number, size: NonZeroU32) -> Self {
        Self { page, size }
    }

    /// Returns number of items to skip before the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.get() as usize - 1) * self.limit()
    }

    /// Returns maximum number of items to return.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.size.get() as usize
    }
}

/// Page of items along with the total count of the items matching the
/// request regardless of pagination.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Page<T> {
    /// Items on this [`Page`].
    pub rows: Vec<T>,

    /// Total number of the items matching the request.
    pub total_count: usize,

    /// [`Arguments`] this [`Page`] was requested with.
    pub arguments: Arguments,
}

impl<T> Page<T> {
    /// Creates a new [`Page`] out of the provided `rows`.
    ///
    /// Excessive `rows` are truncated to the requested limit.
    #[must_use]
    pub fn new(
        arguments: Arguments,
        rows: impl IntoIterator<Item = T>,
        total_count: usize,
    ) -> Self {
        Self {
            rows: rows.into_iter().take(arguments.limit()).collect(),
            total_count,
            arguments,
        }
    }

    /// Returns the total number of pages.
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total_count, self.arguments.size)
    }

    /// Returns the requested page clamped into the existing pages.
    #[must_use]
    pub fn current(&self) -> Number {
        self.arguments.page.clamp_to(self.total_pages())
    }

    /// Indicates whether nothing matches the request at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// Returns the page numbers to render around the current page.
    #[must_use]
    pub fn window(&self) -> RangeInclusive<u32> {
        window(self.current(), self.total_pages())
    }

    /// Maps the rows of this [`Page`].
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            rows: self.rows.into_iter().map(f).collect(),
            total_count: self.total_count,
            arguments: self.arguments,
        }
    }
}

/// Calculates the number of pages needed for `total_count` items.
///
/// There is always at least one page, even if it's empty.
#[must_use]
pub fn total_pages(total_count: usize, size: NonZeroU32) -> u32 {
    let pages = total_count.div_ceil(size.get() as usize).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Returns at most [`WINDOW_WIDTH`] page numbers to render for the `current`
/// page out of `total_pages`.
///
/// The window is centered on the `current` page when there is room on both
/// sides, otherwise it's anchored to the nearer boundary.
#[must_use]
pub fn window(current: Number, total_pages: u32) -> RangeInclusive<u32> {
    let total = total_pages.max(1);
    let width = WINDOW_WIDTH.min(total);
    let current = current.get().min(total);

    let start = current
        .saturating_sub(width / 2)
        .min(total - width + 1)
        .max(1);
    start..=(start + width - 1)
}

/// Defines pagination types.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_pagination {
    ($node:ty, $filter:ty, $order:ty) => {
        #[doc = "A [`Page`] of nodes."]
        pub type Page = $crate::pagination::Page<$node>;

        #[doc = "Arguments for selecting a [`Page`]."]
        pub type Arguments = $crate::pagination::Arguments;

        #[doc = "[`Page`] selector."]
        #[derive(Clone, Debug, PartialEq)]
        pub struct Selector {
            #[doc = "Pagination [`Arguments`]."]
            pub arguments: Arguments,

            #[doc = "Filter being applied to the result."]
            pub filter: $filter,

            #[doc = "Order of the result."]
            pub order: $order,
        }
    };
}

#[cfg(test)]
mod spec {
    use std::num::NonZeroU32;

    use super::{total_pages, window, Arguments, Number, Page, WINDOW_WIDTH};

    fn num(n: u32) -> Number {
        Number::new(n).unwrap()
    }

    fn size(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn offset_and_limit() {
        let args = Arguments::new(num(1), size(12));
        assert_eq!(args.offset(), 0);
        assert_eq!(args.limit(), 12);

        let args = Arguments::new(num(3), size(12));
        assert_eq!(args.offset(), 24);
        assert_eq!(args.limit(), 12);
    }

    #[test]
    fn counts_pages() {
        assert_eq!(total_pages(0, size(12)), 1);
        assert_eq!(total_pages(1, size(12)), 1);
        assert_eq!(total_pages(12, size(12)), 1);
        assert_eq!(total_pages(13, size(12)), 2);
        assert_eq!(total_pages(37, size(12)), 4);
    }

    #[test]
    fn window_stays_in_bounds() {
        for total in 1..=30 {
            for current in 1..=total + 2 {
                let w = window(num(current), total);
                let len = w.clone().count();

                assert_eq!(
                    len,
                    WINDOW_WIDTH.min(total) as usize,
                    "window length for page {current} of {total}",
                );
                assert!(*w.start() >= 1, "page {current} of {total}");
                assert!(*w.end() <= total, "page {current} of {total}");
                assert!(
                    w.contains(&current.min(total)),
                    "page {current} of {total}",
                );
            }
        }
    }

    #[test]
    fn window_centers_when_possible() {
        assert_eq!(window(num(5), 10), 3..=7);
        assert_eq!(window(num(3), 10), 1..=5);
        assert_eq!(window(num(4), 10), 2..=6);
    }

    #[test]
    fn window_anchors_to_boundaries() {
        assert_eq!(window(num(1), 10), 1..=5);
        assert_eq!(window(num(2), 10), 1..=5);
        assert_eq!(window(num(9), 10), 6..=10);
        assert_eq!(window(num(10), 10), 6..=10);
    }

    #[test]
    fn window_of_few_pages() {
        assert_eq!(window(num(1), 1), 1..=1);
        assert_eq!(window(num(2), 2), 1..=2);
        assert_eq!(window(num(1), 3), 1..=3);
        assert_eq!(window(num(3), 3), 1..=3);
        assert_eq!(window(num(4), 4), 1..=4);
    }

    #[test]
    fn page_clamps_current() {
        let page = Page::new(
            Arguments::new(num(7), size(12)),
            Vec::<u8>::new(),
            37,
        );
        assert_eq!(page.total_pages(), 4);
        assert_eq!(page.current(), num(4));
        assert_eq!(page.window(), 1..=4);
    }

    #[test]
    fn page_truncates_rows() {
        let page = Page::new(Arguments::new(num(1), size(2)), [1, 2, 3], 3);
        assert_eq!(page.rows, vec![1, 2]);
        assert!(!page.is_empty());
    }

    #[test]
    fn number_from_i32() {
        assert_eq!(Number::try_from(2), Ok(num(2)));
        assert!(Number::try_from(0).is_err());
        assert!(Number::try_from(-1).is_err());
    }
}
