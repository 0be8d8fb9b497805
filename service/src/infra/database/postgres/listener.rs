//! Listener relaying Postgres notifications into a [`Feed`].

use std::pin::pin;

use common::operations::{By, Start, Subscribe};
use futures::{
    future::{self, Either},
    stream, StreamExt as _,
};
use tokio_postgres::{AsyncMessage, NoTls, Notification};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user,
    infra::{
        database::{self, postgres},
        Database, Postgres,
    },
    read::message::{Change, Changes},
};
#[cfg(doc)]
use crate::infra::Feed;

use super::CHANGES_CHANNEL;

impl Database<Subscribe<By<Changes, user::Id>>> for Postgres {
    type Ok = Changes;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Subscribe(by): Subscribe<By<Changes, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.feed.subscribe(by.into_inner()))
    }
}

/// Listens to the [`CHANGES_CHANNEL`] on a dedicated connection and publishes
/// every received [`Change`] into the [`Feed`].
///
/// Once listening, resyncs the [`Feed`] subscribers, as the [`Change`]s
/// happened while not listening are lost. Resolves once the connection is
/// lost.
impl Database<Start<By<Changes, ()>>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Start<By<Changes, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = self
            .config
            .get_pg_config()
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;
        let (client, mut connection) = config
            .connect(NoTls)
            .await
            .map_err(tracerr::from_and_wrap!(=> postgres::Error))
            .map_err(tracerr::map_from)?;

        // The connection must be polled for `LISTEN` to complete.
        let relay = async move {
            let mut messages =
                stream::poll_fn(|cx| connection.poll_message(cx));
            while let Some(msg) = messages.next().await {
                match msg
                    .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                    .map_err(tracerr::map_from)?
                {
                    AsyncMessage::Notification(n) => self.relay(&n),
                    AsyncMessage::Notice(n) => {
                        log::debug!("Postgres notice: {n}");
                    }
                    #[expect(
                        clippy::wildcard_enum_match_arm,
                        reason = "`AsyncMessage` is non-exhaustive"
                    )]
                    _ => {}
                }
            }
            Ok::<_, Traced<database::Error>>(())
        };
        let listen = async move {
            client
                .batch_execute(&format!("LISTEN {CHANGES_CHANNEL}"))
                .await
                .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                .map_err(tracerr::map_from)?;
            log::info!("listening to `{CHANGES_CHANNEL}` notifications");
            // Nothing was relayed until now.
            self.feed.resync();
            future::pending::<Result<(), Traced<database::Error>>>().await
        };

        match future::select(pin!(relay), pin!(listen)).await {
            Either::Left((res, _)) | Either::Right((res, _)) => res,
        }
    }
}

impl Postgres {
    /// Publishes the [`Change`] carried by the provided [`Notification`].
    fn relay(&self, notification: &Notification) {
        if notification.channel() != CHANGES_CHANNEL {
            return;
        }
        match serde_json::from_str::<Change>(notification.payload()) {
            Ok(change) => self.feed.publish(change),
            Err(e) => log::warn!(
                "malformed `{CHANGES_CHANNEL}` payload `{}`: {e}",
                notification.payload(),
            ),
        }
    }
}
