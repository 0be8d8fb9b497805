//! [`Enrollment`] form.

use std::{ops::RangeInclusive, sync::LazyLock};

use regex::Regex;

use crate::{
    domain::{self, enrollment, user},
    validation::{Errors, Validate},
};

use super::{non_empty, PHONE};

/// Format of an e-mail address.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex")
});

/// Form enrolling a child into a ski lesson program.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Enrollment {
    /// Full name of the student.
    pub student_name: String,

    /// Age of the student in years.
    pub student_age: String,

    /// Full name of the parent or guardian.
    pub parent_name: String,

    /// Contact e-mail of the parent.
    pub email: String,

    /// Contact phone number of the parent.
    pub phone: String,

    /// One of the [`Enrollment::SKILL_LEVELS`].
    pub skill_level: String,

    /// One of the [`Enrollment::PROGRAMS`].
    pub program: String,

    /// Allergies, conditions and other notes for the instructors.
    pub medical_notes: String,
}

impl Enrollment {
    /// Ages of students accepted into the programs.
    pub const AGES: RangeInclusive<i64> = 4..=17;

    /// Skill levels a student may have.
    pub const SKILL_LEVELS: &'static [&'static str] =
        &["beginner", "intermediate", "advanced"];

    /// Offered lesson programs.
    pub const PROGRAMS: &'static [&'static str] = &[
        "first_tracks",
        "mountain_explorers",
        "freestyle_team",
        "race_team",
    ];
}

impl Validate for Enrollment {
    fn validate(&self) -> Errors {
        let mut errors = Errors::new();

        _ = errors
            .field("student_name", &self.student_name)
            .required("Student name is required")
            .max_chars(100, "Student name must be at most 100 characters");
        _ = errors
            .field("student_age", &self.student_age)
            .required("Student age is required")
            .integer_in(Self::AGES, "Student age must be between 4 and 17");
        _ = errors
            .field("parent_name", &self.parent_name)
            .required("Parent name is required");
        _ = errors
            .field("email", &self.email)
            .required("Email is required")
            .matches(&EMAIL, "Invalid email address");
        _ = errors
            .field("phone", &self.phone)
            .required("Phone is required")
            .matches(&PHONE, "Invalid phone number");
        _ = errors
            .field("skill_level", &self.skill_level)
            .required("Skill level is required")
            .one_of(Self::SKILL_LEVELS, "Unknown skill level");
        _ = errors
            .field("program", &self.program)
            .required("Program is required")
            .one_of(Self::PROGRAMS, "Unknown program");
        _ = errors
            .field("medical_notes", &self.medical_notes)
            .optional()
            .max_chars(500, "Medical notes must be at most 500 characters");

        errors
    }
}

impl Enrollment {
    /// Validates this [`Enrollment`] form and turns it into a new
    /// [`domain::Enrollment`] submitted by the provided parent.
    ///
    /// # Errors
    ///
    /// If this [`Enrollment`] form is invalid.
    pub fn into_enrollment(
        self,
        parent_id: user::Id,
    ) -> Result<domain::Enrollment, Errors> {
        self.validate().into_result()?;

        let mut errors = Errors::new();
        let student_age = self.student_age.trim().parse::<u8>().ok();
        if student_age.is_none() {
            errors.add("student_age", "Invalid value");
        }
        let skill_level = self
            .skill_level
            .trim()
            .parse::<enrollment::SkillLevel>()
            .ok();
        if skill_level.is_none() {
            errors.add("skill_level", "Invalid value");
        }
        let program = self.program.trim().parse::<enrollment::Program>().ok();
        if program.is_none() {
            errors.add("program", "Invalid value");
        }
        let (Some(student_age), Some(skill_level), Some(program)) =
            (student_age, skill_level, program)
        else {
            return Err(errors);
        };

        Ok(domain::Enrollment {
            id: enrollment::Id::new(),
            parent_id,
            student_name: self.student_name.trim().to_owned(),
            student_age,
            parent_name: self.parent_name.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            skill_level,
            program,
            medical_notes: non_empty(&self.medical_notes),
            created_at: enrollment::CreationDateTime::now(),
        })
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{enrollment, user},
        validation::Validate as _,
    };

    use super::Enrollment;

    fn valid() -> Enrollment {
        Enrollment {
            student_name: "Sam Lee".into(),
            student_age: "9".into(),
            parent_name: "Alex Lee".into(),
            email: "alex.lee@example.com".into(),
            phone: "303-555-0199".into(),
            skill_level: "Beginner".into(),
            program: "first_tracks".into(),
            medical_notes: String::new(),
        }
    }

    #[test]
    fn accepts_valid_form() {
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn checks_age_bounds() {
        let ages = [
            ("3", false),
            ("4", true),
            ("17", true),
            ("18", false),
            ("x", false),
        ];
        for (age, valid_age) in ages {
            let errors = Enrollment {
                student_age: age.into(),
                ..valid()
            }
            .validate();

            assert_eq!(errors.get("student_age").is_none(), valid_age, "{age}");
        }
    }

    #[test]
    fn reports_every_empty_field() {
        let errors = Enrollment::default().validate();

        assert_eq!(errors.len(), 7);
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("medical_notes"), None);
    }

    #[test]
    fn checks_formats() {
        let errors = Enrollment {
            email: "alex@localhost".into(),
            program: "heli_skiing".into(),
            ..valid()
        }
        .validate();

        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(errors.get("program"), Some("Unknown program"));
    }

    #[test]
    fn offers_every_kind() {
        for level in Enrollment::SKILL_LEVELS {
            let parsed = level.parse::<enrollment::SkillLevel>();
            assert!(parsed.is_ok(), "{level}");
        }
        assert_eq!(
            Enrollment::SKILL_LEVELS.len(),
            enrollment::SkillLevel::ALL.len(),
        );
        for program in Enrollment::PROGRAMS {
            let parsed = program.parse::<enrollment::Program>();
            assert!(parsed.is_ok(), "{program}");
        }
        assert_eq!(Enrollment::PROGRAMS.len(), enrollment::Program::ALL.len());
    }

    #[test]
    fn converts_into_enrollment() {
        let parent = user::Id::new();
        let submitted = Enrollment {
            student_name: " Sam Lee ".into(),
            program: "Race_Team".into(),
            medical_notes: "  ".into(),
            ..valid()
        }
        .into_enrollment(parent)
        .unwrap();

        assert_eq!(submitted.parent_id, parent);
        assert_eq!(submitted.student_name, "Sam Lee");
        assert_eq!(submitted.student_age, 9);
        assert_eq!(submitted.skill_level, enrollment::SkillLevel::Beginner);
        assert_eq!(submitted.program, enrollment::Program::RaceTeam);
        assert_eq!(submitted.medical_notes, None);
    }

    #[test]
    fn refuses_converting_invalid_form() {
        let errors = Enrollment {
            student_age: "21".into(),
            ..valid()
        }
        .into_enrollment(user::Id::new())
        .unwrap_err();

        assert_eq!(
            errors.get("student_age"),
            Some("Student age must be between 4 and 17"),
        );
    }
}
