//! [`Command`] for sending a new [`Message`].

use common::operations::Insert;
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::Message,
    form,
    infra::{database, Database},
    validation, Service,
};

use super::Command;

/// [`Command`] for sending a new [`Message`] out of a [`form::Message`].
///
/// Nothing is stored unless the [`form::Message`] is valid.
#[derive(Clone, Debug, From)]
pub struct SendMessage {
    /// Submitted [`form::Message`].
    pub form: form::Message,
}

impl<Db> Command<SendMessage> for Service<Db>
where
    Db: Database<Insert<Message>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Message;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SendMessage) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let msg = cmd
            .form
            .into_message()
            .map_err(tracerr::from_and_wrap!(=> E))?;

        self.database()
            .execute(Insert(msg.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(msg)
    }
}

/// Error of [`SendMessage`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Submitted [`form::Message`] is invalid.
    #[display("Invalid `form::Message`: {_0}")]
    Invalid(validation::Errors),
}
