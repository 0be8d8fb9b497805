//! Postgres [`Database`] implementation.

pub mod client;
mod impls;
mod like_pattern;
mod listener;

use deadpool_postgres::Runtime;
use derive_more::{Deref, Display, Error as StdError, From};
use tokio_postgres::NoTls;
use tracerr::Traced;

use crate::infra::{database, Feed};
#[cfg(doc)]
use crate::infra::Database;

pub use refinery::embed_migrations;

pub use self::{
    client::{Client, Connection},
    like_pattern::LikePattern,
};

pub use deadpool_postgres::Config;

/// Postgres [`Database`] client.
///
/// [`Message`] changes are delivered by Postgres notifications on the
/// [`CHANGES_CHANNEL`], and relayed into the [`Feed`] of this client while
/// the [`Postgres`] listener is running.
///
/// [`Message`]: crate::domain::Message
#[derive(Clone, Debug, Deref)]
pub struct Postgres {
    /// Client to execute queries with.
    #[deref]
    client: Client,

    /// [`Feed`] of [`Message`] changes.
    ///
    /// [`Message`]: crate::domain::Message
    feed: Feed,

    /// [`Config`] to open a dedicated listener connection with.
    config: Config,
}

/// Name of the Postgres notification channel delivering [`Message`] changes.
///
/// [`Message`]: crate::domain::Message
pub const CHANGES_CHANNEL: &str = "message_changes";

impl Postgres {
    /// Creates a new [`Postgres`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If failed to create a new [`Postgres`] client.
    pub fn new(conf: &Config) -> Result<Self, Traced<database::Error>> {
        let pool = conf
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            client: Client::new(pool),
            feed: Feed::new(),
            config: conf.clone(),
        })
    }

    /// Returns [`Feed`] of this [`Postgres`] client.
    #[must_use]
    pub fn feed(&self) -> &Feed {
        &self.feed
    }
}

/// Postgres database [`Error`].
#[derive(Debug, Display, StdError, From)]
pub enum Error {
    /// Error reported by the Postgres driver.
    #[display("Postgres error: {_0}")]
    Driver(tokio_postgres::Error),

    /// [`Config`] doesn't describe a valid connection.
    #[display("Invalid `Config`: {_0}")]
    Config(deadpool_postgres::ConfigError),

    /// Connections [`Pool`] cannot be created.
    ///
    /// [`Pool`]: deadpool_postgres::Pool
    #[display("Failed to create connections `Pool`: {_0}")]
    PoolCreation(deadpool_postgres::CreatePoolError),

    /// No connection could be checked out of the [`Pool`].
    ///
    /// [`Pool`]: deadpool_postgres::Pool
    #[display("Failed to check out a connection: {_0}")]
    Checkout(deadpool_postgres::PoolError),
}
