//! [`Command`] for creating a new [`Listing`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, Listing},
    form,
    infra::{database, Database},
    validation, Service,
};

use super::Command;

/// [`Command`] for creating a new [`Listing`] out of a [`form::Listing`].
///
/// Nothing is stored unless the [`form::Listing`] is valid.
#[derive(Clone, Debug)]
pub struct CreateListing {
    /// ID of the user selling the new [`Listing`].
    pub seller_id: user::Id,

    /// Submitted [`form::Listing`].
    pub form: form::Listing,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<Insert<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing { seller_id, form } = cmd;

        let listing = form
            .into_listing(seller_id)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Insert(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            "`User(id: {seller_id})` listed `Listing(id: {})`",
            listing.id,
        );
        Ok(listing)
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::Listing`] is invalid.
    #[display("Invalid `form::Listing`: {_0}")]
    Invalid(validation::Errors),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Select},
        pagination::Number,
        Handler as _,
    };

    use crate::{
        domain::{user, Listing},
        form,
        infra::Memory,
        query,
        read::listing::list::{self, Filter, Selector, Sort},
        Service,
    };

    use super::{CreateListing, ExecutionError};

    fn form() -> form::Listing {
        form::Listing {
            title: "Burton Custom 158".into(),
            description: "Stiff, poppy, barely used.".into(),
            category: "snowboards".into(),
            condition: "like_new".into(),
            price: "299".into(),
            size: "158".into(),
            trade_only: false,
            images: vec![],
        }
    }

    async fn total(svc: &Service<Memory>) -> usize {
        svc.execute(query::listings::Search::by(Selector {
            arguments: list::Arguments::new(Number::FIRST, list::PAGE_SIZE),
            filter: Filter::default(),
            order: Sort::Newest,
        }))
        .await
        .unwrap()
        .total_count
    }

    #[tokio::test]
    async fn stores_valid_listing() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let seller = user::Id::new();

        let listing = svc
            .execute(CreateListing {
                seller_id: seller,
                form: form(),
            })
            .await
            .unwrap();

        let stored = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert_eq!(stored, Some(listing));
        assert_eq!(total(&svc).await, 1);
    }

    #[tokio::test]
    async fn never_stores_invalid_listing() {
        let (svc, _) =
            Service::new(crate::spec::config(b"s"), Memory::new());

        let err = svc
            .execute(CreateListing {
                seller_id: user::Id::new(),
                form: form::Listing {
                    title: String::new(),
                    trade_only: false,
                    price: "-5".into(),
                    ..form()
                },
            })
            .await
            .unwrap_err();

        let ExecutionError::Invalid(errors) = err.as_ref() else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(
            errors.get("price"),
            Some("Price must be a valid positive number"),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(total(&svc).await, 0);
    }
}
