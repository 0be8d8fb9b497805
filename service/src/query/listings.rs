//! [`Query`] collection related to the multiple [`Listing`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Listing, Query};

use super::DatabaseQuery;

/// Searches a [`read::listing::list::Page`] of active [`Listing`]s.
///
/// Both the rows and their total count are read at once.
pub type Search = DatabaseQuery<
    By<read::listing::list::Page, read::listing::list::Selector>,
>;
