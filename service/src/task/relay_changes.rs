//! [`RelayChanges`] [`Task`].

use std::{convert::Infallible, time};

use common::operations::{By, Start};
use tracerr::Traced;
use tracing as log;

use crate::{
    infra::{database, Database},
    read::message::Changes,
    Service,
};
#[cfg(doc)]
use crate::domain::Message;

use super::Task;

/// Configuration for [`RelayChanges`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Delay before restarting the relay once it stops.
    pub reconnect_interval: time::Duration,
}

/// [`Task`] relaying [`Message`] changes from the [`Database`] to its
/// subscribers, restarting the relay whenever it stops.
#[derive(Clone, Copy, Debug)]
pub struct RelayChanges<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<RelayChanges<Self>, Config>>> for Service<Db>
where
    Db: Database<
        Start<By<Changes, ()>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RelayChanges<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task = RelayChanges {
            config: by.into_inner(),
            service: self.clone(),
        };

        loop {
            match task
                .service
                .database()
                .execute(Start(By::<Changes, _>::new(())))
                .await
            {
                Ok(()) => log::warn!("`task::RelayChanges` stopped"),
                Err(e) => log::error!("`task::RelayChanges` failed: {e}"),
            }
            tokio::time::sleep(task.config.reconnect_interval).await;
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{
        sync::{
            atomic::{self, AtomicUsize},
            Arc,
        },
        time::Duration,
    };

    use common::{
        operations::{By, Start},
        Handler as _,
    };
    use tracerr::Traced;

    use crate::{
        infra::{database, database::memory, Database},
        read::message::Changes,
        Service,
    };

    /// [`Database`] failing to start relaying every time.
    #[derive(Clone, Debug, Default)]
    struct Flaky {
        starts: Arc<AtomicUsize>,
    }

    impl Database<Start<By<Changes, ()>>> for Flaky {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            _: Start<By<Changes, ()>>,
        ) -> Result<Self::Ok, Self::Err> {
            _ = self.starts.fetch_add(1, atomic::Ordering::SeqCst);
            Err(tracerr::new!(database::Error::from(
                memory::Error::Unavailable
            )))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn restarts_after_reconnect_interval() {
        let db = Flaky::default();
        let svc = Service::new(crate::spec::config(b"secret"), db.clone()).0;

        let relay = svc.execute(Start(By::new(svc.config().relay_changes)));
        let res =
            tokio::time::timeout(Duration::from_millis(2500), relay).await;

        assert!(res.is_err(), "relay must never give up");
        assert_eq!(db.starts.load(atomic::Ordering::SeqCst), 3);
    }
}
