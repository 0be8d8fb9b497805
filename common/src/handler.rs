//! [`Handler`] abstractions.

use std::future::Future;

/// Executable handler.
///
/// Every layer of the application is expressed through this trait: queries
/// and commands of a service, operations of a database, background tasks.
pub trait Handler<Args = ()> {
    /// Type of successful [`Handler`] result.
    type Ok;

    /// Type of this [`Handler`] error.
    type Err;

    /// Executes this [`Handler`] with the provided arguments.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
