//! [`Enrollment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;

/// Enrollment of a child into a ski lesson [`Program`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Enrollment {
    /// ID of this [`Enrollment`].
    pub id: Id,

    /// ID of the [`user`] who submitted this [`Enrollment`].
    pub parent_id: user::Id,

    /// Full name of the student.
    pub student_name: String,

    /// Age of the student in years.
    pub student_age: u8,

    /// Full name of the parent or guardian.
    pub parent_name: String,

    /// Contact e-mail of the parent.
    pub email: String,

    /// Contact phone number of the parent.
    pub phone: String,

    /// [`SkillLevel`] of the student.
    pub skill_level: SkillLevel,

    /// [`Program`] the student is enrolled into.
    pub program: Program,

    /// Notes for the instructors, if any.
    pub medical_notes: Option<String>,

    /// [`DateTime`] when this [`Enrollment`] was submitted.
    pub created_at: CreationDateTime,
}

/// ID of an [`Enrollment`].
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

define_kind! {
    #[doc = "Skill level of a student."]
    enum SkillLevel {
        #[doc = "Never skied before."]
        Beginner = 1,

        #[doc = "Links turns on blue runs."]
        Intermediate = 2,

        #[doc = "Comfortable anywhere on the mountain."]
        Advanced = 3,
    }
}

define_kind! {
    #[doc = "Offered lesson program."]
    enum Program {
        #[doc = "First days on snow."]
        FirstTracks = 1,

        #[doc = "Guided exploring of the whole mountain."]
        MountainExplorers = 2,

        #[doc = "Park and pipe training."]
        FreestyleTeam = 3,

        #[doc = "Gate training and racing."]
        RaceTeam = 4,
    }
}

/// [`DateTime`] when an [`Enrollment`] was submitted.
pub type CreationDateTime = DateTimeOf<(Enrollment, unit::Creation)>;
