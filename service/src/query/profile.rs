//! [`Query`] collection related to a single [`Profile`].

use common::operations::By;

use crate::domain::{user, Profile};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Profile`] by the ID of its user.
pub type ByUserId = DatabaseQuery<By<Option<Profile>, user::Id>>;
