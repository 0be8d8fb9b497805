//! [`Query`] collection related to the multiple [`Enrollment`]s.

use common::operations::By;

use crate::domain::{user, Enrollment};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Enrollment`]s submitted by a parent, the most recent
/// first.
pub type ByParent = DatabaseQuery<By<Vec<Enrollment>, user::Id>>;
