//! [`Command`] for updating a [`Profile`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{profile, user, Profile},
    form,
    infra::{database, Database},
    validation, Service,
};

use super::Command;

/// [`Command`] for creating or updating the [`Profile`] of a user out of a
/// [`form::Profile`].
///
/// Nothing is stored unless the [`form::Profile`] is valid and its
/// [`profile::Username`] is not taken by another user.
#[derive(Clone, Debug)]
pub struct UpdateProfile {
    /// ID of the user owning the [`Profile`].
    pub user_id: user::Id,

    /// Submitted [`form::Profile`].
    pub form: form::Profile,
}

impl<Db> Command<UpdateProfile> for Service<Db>
where
    Db: Database<
            Select<By<Option<Profile>, profile::Username>>,
            Ok = Option<Profile>,
            Err = Traced<database::Error>,
        > + Database<Update<Profile>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Profile;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateProfile) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateProfile { user_id, form } = cmd;

        let profile = form
            .into_profile(user_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let owner = self
            .database()
            .execute(Select(By::<Option<Profile>, _>::new(
                profile.username.clone(),
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map(|p| p.user_id);
        if owner.is_some_and(|id| id != user_id) {
            return Err(tracerr::new!(E::UsernameOccupied(profile.username)));
        }

        self.database()
            .execute(Update(profile.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!("`User(id: {user_id})` updated profile");
        Ok(profile)
    }
}

/// Error of [`UpdateProfile`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::Profile`] is invalid.
    #[display("Invalid `form::Profile`: {_0}")]
    Invalid(validation::Errors),

    /// [`profile::Username`] is taken by another user.
    #[display("`Username({_0})` is occupied")]
    #[from(ignore)]
    UsernameOccupied(#[error(not(source))] profile::Username),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        Handler as _,
    };

    use crate::{
        domain::{user, Profile},
        form,
        infra::Memory,
        Service,
    };

    use super::{ExecutionError, UpdateProfile};

    fn form(username: &str) -> form::Profile {
        form::Profile {
            full_name: "Jordan Rivers".into(),
            username: username.into(),
            bio: String::new(),
            phone: String::new(),
        }
    }

    async fn stored(db: &Memory, user_id: user::Id) -> Option<Profile> {
        db.execute(Select(By::<Option<Profile>, _>::new(user_id)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn stores_and_updates_profile() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let me = user::Id::new();

        _ = svc
            .execute(UpdateProfile {
                user_id: me,
                form: form("powder_hound"),
            })
            .await
            .unwrap();
        let updated = svc
            .execute(UpdateProfile {
                user_id: me,
                form: form::Profile {
                    bio: "Telemark forever.".into(),
                    ..form("Powder_Hound")
                },
            })
            .await
            .unwrap();

        assert_eq!(stored(&db, me).await, Some(updated));
    }

    #[tokio::test]
    async fn never_stores_invalid_profile() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let me = user::Id::new();

        let err = svc
            .execute(UpdateProfile {
                user_id: me,
                form: form::Profile {
                    full_name: String::new(),
                    ..form("no spaces allowed")
                },
            })
            .await
            .unwrap_err();

        let ExecutionError::Invalid(errors) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(errors.get("full_name"), Some("Full name is required"));
        assert!(errors.get("username").is_some());
        assert_eq!(stored(&db, me).await, None);
    }

    #[tokio::test]
    async fn refuses_occupied_username() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let (first, second) = (user::Id::new(), user::Id::new());
        _ = svc
            .execute(UpdateProfile {
                user_id: first,
                form: form("powder_hound"),
            })
            .await
            .unwrap();

        let err = svc
            .execute(UpdateProfile {
                user_id: second,
                form: form("POWDER_HOUND"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UsernameOccupied(_)));
        assert_eq!(stored(&db, second).await, None);
    }
}
