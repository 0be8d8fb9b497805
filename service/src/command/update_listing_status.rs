//! [`Command`] for updating a [`listing::Status`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{listing, user, Listing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`listing::Status`] by the seller (marking the
/// [`Listing`] as sold, for example).
#[derive(Clone, Copy, Debug)]
pub struct UpdateListingStatus {
    /// ID of the [`Listing`] to update.
    pub listing_id: listing::Id,

    /// ID of the user initiating the update.
    pub initiator_id: user::Id,

    /// New [`listing::Status`].
    pub status: listing::Status,
}

impl<Db> Command<UpdateListingStatus> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateListingStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListingStatus {
            listing_id,
            initiator_id,
            status,
        } = cmd;

        let mut listing = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(listing_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(listing_id))
            .map_err(tracerr::wrap!())?;

        if listing.seller_id != initiator_id {
            return Err(tracerr::new!(E::NotSeller(initiator_id)));
        }
        if listing.status == status {
            return Ok(listing);
        }

        let previous = listing.status;
        listing.status = status;
        self.database()
            .execute(Update(listing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        log::info!(
            "`Listing(id: {listing_id})` status changed: {previous} -> {status}",
        );
        Ok(listing)
    }
}

/// Error of [`UpdateListingStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] with the provided ID does not exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Initiator is not the seller of the [`Listing`].
    #[display("`User(id: {_0})` is not the seller")]
    #[from(ignore)]
    NotSeller(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Handler as _};
    use rust_decimal::Decimal;

    use crate::{
        domain::{listing, user, Listing},
        infra::Memory,
        Service,
    };

    use super::{ExecutionError, UpdateListingStatus};

    fn listing(seller_id: user::Id) -> Listing {
        Listing {
            id: listing::Id::new(),
            seller_id,
            title: listing::Title::new("Salomon QST 106").unwrap(),
            description: listing::Description::new("Great in powder.")
                .unwrap(),
            category: listing::Category::Skis,
            condition: listing::Condition::Fair,
            size: None,
            price: listing::Price::new(Decimal::new(220, 0)),
            trade_only: false,
            images: vec![],
            status: listing::Status::Active,
            created_at: listing::CreationDateTime::now(),
        }
    }

    #[tokio::test]
    async fn seller_marks_sold() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let seller = user::Id::new();
        let l = listing(seller);
        db.execute(Insert(l.clone())).await.unwrap();

        let updated = svc
            .execute(UpdateListingStatus {
                listing_id: l.id,
                initiator_id: seller,
                status: listing::Status::Sold,
            })
            .await
            .unwrap();

        assert_eq!(updated.status, listing::Status::Sold);
    }

    #[tokio::test]
    async fn others_cannot_update() {
        let db = Memory::new();
        let (svc, _) = Service::new(crate::spec::config(b"s"), db.clone());
        let l = listing(user::Id::new());
        db.execute(Insert(l.clone())).await.unwrap();

        let err = svc
            .execute(UpdateListingStatus {
                listing_id: l.id,
                initiator_id: user::Id::new(),
                status: listing::Status::Archived,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotSeller(_)));
    }

    #[tokio::test]
    async fn fails_on_unknown_listing() {
        let (svc, _) =
            Service::new(crate::spec::config(b"s"), Memory::new());

        let err = svc
            .execute(UpdateListingStatus {
                listing_id: listing::Id::new(),
                initiator_id: user::Id::new(),
                status: listing::Status::Sold,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
