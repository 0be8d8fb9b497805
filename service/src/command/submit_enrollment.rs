//! [`Command`] for submitting a new [`Enrollment`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, Enrollment},
    form,
    infra::{database, Database},
    validation, Service,
};

use super::Command;

/// [`Command`] for submitting a new [`Enrollment`] out of a
/// [`form::Enrollment`].
///
/// Nothing is stored unless the [`form::Enrollment`] is valid.
#[derive(Clone, Debug)]
pub struct SubmitEnrollment {
    /// ID of the user submitting the [`Enrollment`].
    pub parent_id: user::Id,

    /// Submitted [`form::Enrollment`].
    pub form: form::Enrollment,
}

impl<Db> Command<SubmitEnrollment> for Service<Db>
where
    Db: Database<Insert<Enrollment>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Enrollment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SubmitEnrollment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SubmitEnrollment { parent_id, form } = cmd;

        let enrollment = form
            .into_enrollment(parent_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Insert(enrollment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            "`User(id: {parent_id})` submitted `Enrollment(id: {})` into \
             `{}` program",
            enrollment.id,
            enrollment.program,
        );
        Ok(enrollment)
    }
}

/// Error of [`SubmitEnrollment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::Enrollment`] is invalid.
    #[display("Invalid `form::Enrollment`: {_0}")]
    Invalid(validation::Errors),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{domain::user, form, infra::Memory, query, Service};

    use super::{ExecutionError, SubmitEnrollment};

    fn form() -> form::Enrollment {
        form::Enrollment {
            student_name: "Sam Lee".into(),
            student_age: "9".into(),
            parent_name: "Alex Lee".into(),
            email: "alex.lee@example.com".into(),
            phone: "303-555-0199".into(),
            skill_level: "beginner".into(),
            program: "first_tracks".into(),
            medical_notes: "Peanut allergy".into(),
        }
    }

    #[tokio::test]
    async fn stores_valid_enrollment() {
        let (svc, _) = Service::new(crate::spec::config(b"s"), Memory::new());
        let parent = user::Id::new();

        let enrollment = svc
            .execute(SubmitEnrollment {
                parent_id: parent,
                form: form(),
            })
            .await
            .unwrap();

        let stored = svc
            .execute(query::enrollments::ByParent::by(parent))
            .await
            .unwrap();
        assert_eq!(stored, vec![enrollment]);
    }

    #[tokio::test]
    async fn never_stores_invalid_enrollment() {
        let (svc, _) = Service::new(crate::spec::config(b"s"), Memory::new());
        let parent = user::Id::new();

        let err = svc
            .execute(SubmitEnrollment {
                parent_id: parent,
                form: form::Enrollment {
                    student_age: "3".into(),
                    email: "nope".into(),
                    ..form()
                },
            })
            .await
            .unwrap_err();

        let ExecutionError::Invalid(errors) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Invalid email address"));
        let stored = svc
            .execute(query::enrollments::ByParent::by(parent))
            .await
            .unwrap();
        assert!(stored.is_empty());
    }
}
