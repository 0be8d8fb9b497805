//! [`Enrollment`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLInputObject, GraphQLScalar};
use service::{domain, form};
use uuid::Uuid;

use crate::Context;

/// Enrollment of a child into a ski lesson program.
#[derive(Clone, Debug, From)]
pub struct Enrollment(domain::Enrollment);

/// Enrollment of a child into a ski lesson program.
#[graphql_object(context = Context)]
impl Enrollment {
    /// Unique identifier of this `Enrollment`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Full name of the student.
    #[must_use]
    pub fn student_name(&self) -> &str {
        &self.0.student_name
    }

    /// Age of the student in years.
    #[must_use]
    pub fn student_age(&self) -> i32 {
        self.0.student_age.into()
    }

    /// Full name of the parent or guardian.
    #[must_use]
    pub fn parent_name(&self) -> &str {
        &self.0.parent_name
    }

    /// Contact e-mail of the parent.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Contact phone number of the parent.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.0.phone
    }

    /// Skill level of the student.
    #[must_use]
    pub fn skill_level(&self) -> SkillLevel {
        self.0.skill_level.into()
    }

    /// Program the student is enrolled into.
    #[must_use]
    pub fn program(&self) -> Program {
        self.0.program.into()
    }

    /// Notes for the instructors.
    #[must_use]
    pub fn medical_notes(&self) -> Option<&str> {
        self.0.medical_notes.as_deref()
    }

    /// `DateTime` when this `Enrollment` was submitted.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of an `Enrollment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::enrollment::Id)]
#[into(domain::enrollment::Id)]
#[graphql(name = "EnrollmentId", transparent)]
pub struct Id(Uuid);

/// Skill level of a student.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "EnrollmentSkillLevel")]
pub enum SkillLevel {
    /// Never skied before.
    Beginner,

    /// Links turns on blue runs.
    Intermediate,

    /// Comfortable anywhere on the mountain.
    Advanced,
}

impl From<domain::enrollment::SkillLevel> for SkillLevel {
    fn from(level: domain::enrollment::SkillLevel) -> Self {
        use domain::enrollment::SkillLevel as L;
        match level {
            L::Beginner => Self::Beginner,
            L::Intermediate => Self::Intermediate,
            L::Advanced => Self::Advanced,
        }
    }
}

/// Offered lesson program.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "EnrollmentProgram")]
pub enum Program {
    /// First days on snow.
    FirstTracks,

    /// Guided exploring of the whole mountain.
    MountainExplorers,

    /// Park and pipe training.
    FreestyleTeam,

    /// Gate training and racing.
    RaceTeam,
}

impl From<domain::enrollment::Program> for Program {
    fn from(program: domain::enrollment::Program) -> Self {
        use domain::enrollment::Program as P;
        match program {
            P::FirstTracks => Self::FirstTracks,
            P::MountainExplorers => Self::MountainExplorers,
            P::FreestyleTeam => Self::FreestyleTeam,
            P::RaceTeam => Self::RaceTeam,
        }
    }
}

/// Input for enrolling a child into a lesson program.
///
/// Values are checked on submission, so that every invalid field is
/// reported at once.
#[derive(Clone, Debug, GraphQLInputObject)]
#[graphql(name = "EnrollmentInput")]
pub struct Input {
    /// Full name of the student, at most 100 characters.
    pub student_name: String,

    /// Age of the student, 4 to 17 years.
    pub student_age: String,

    /// Full name of the parent or guardian.
    pub parent_name: String,

    /// Contact e-mail of the parent.
    pub email: String,

    /// Contact phone number of the parent.
    pub phone: String,

    /// Name of an `EnrollmentSkillLevel`.
    pub skill_level: String,

    /// Name of an `EnrollmentProgram`.
    pub program: String,

    /// Allergies, conditions and other notes, at most 500 characters.
    pub medical_notes: Option<String>,
}

impl From<Input> for form::Enrollment {
    fn from(input: Input) -> Self {
        let Input {
            student_name,
            student_age,
            parent_name,
            email,
            phone,
            skill_level,
            program,
            medical_notes,
        } = input;
        Self {
            student_name,
            student_age,
            parent_name,
            email,
            phone,
            skill_level,
            program,
            medical_notes: medical_notes.unwrap_or_default(),
        }
    }
}
