//! Infrastructure layer.

pub mod database;
pub mod feed;

pub use self::{
    database::{Database, Memory},
    feed::Feed,
};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
