//! [`Command`] for marking a [`Message`] as read.

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{message, user, Message},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Message`] as read by its receiver.
#[derive(Clone, Copy, Debug)]
pub struct MarkMessageRead {
    /// ID of the [`Message`] to mark.
    pub message_id: message::Id,

    /// ID of the user reading the [`Message`].
    pub reader_id: user::Id,
}

impl<Db> Command<MarkMessageRead> for Service<Db>
where
    Db: Database<
            Select<By<Option<Message>, message::Id>>,
            Ok = Option<Message>,
            Err = Traced<database::Error>,
        > + Database<Update<Message>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Message;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkMessageRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkMessageRead {
            message_id,
            reader_id,
        } = cmd;

        let mut msg = self
            .database()
            .execute(Select(By::<Option<Message>, _>::new(message_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::MessageNotExists(message_id))
            .map_err(tracerr::wrap!())?;

        if msg.receiver_id != reader_id {
            return Err(tracerr::new!(E::NotReceiver(reader_id)));
        }
        if msg.read {
            return Ok(msg);
        }

        msg.read = true;
        self.database()
            .execute(Update(msg.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(msg)
    }
}

/// Error of [`MarkMessageRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Message`] with the provided ID does not exist.
    #[display("`Message(id: {_0})` does not exist")]
    #[from(ignore)]
    MessageNotExists(#[error(not(source))] message::Id),

    /// Reader is not the receiver of the [`Message`].
    #[display("`User(id: {_0})` is not the receiver")]
    #[from(ignore)]
    NotReceiver(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::Handler as _;

    use crate::{
        command::SendMessage, domain::user, form, infra::Memory, query,
        Service,
    };

    use super::{ExecutionError, MarkMessageRead};

    fn form(sender_id: user::Id, receiver_id: user::Id) -> form::Message {
        form::Message {
            sender_id,
            receiver_id,
            listing_id: None,
            body: "Would you take $150?".into(),
        }
    }

    #[tokio::test]
    async fn receiver_reads_message() {
        let (svc, _) =
            Service::new(crate::spec::config(b"s"), Memory::new());
        let (alice, bob) = (user::Id::new(), user::Id::new());

        let msg = svc
            .execute(SendMessage::from(form(alice, bob)))
            .await
            .unwrap();
        let unread = svc
            .execute(query::messages::UnreadCount::by(bob))
            .await
            .unwrap();
        assert_eq!(i32::from(unread), 1);

        let msg = svc
            .execute(MarkMessageRead {
                message_id: msg.id,
                reader_id: bob,
            })
            .await
            .unwrap();
        assert!(msg.read);

        let unread = svc
            .execute(query::messages::UnreadCount::by(bob))
            .await
            .unwrap();
        assert_eq!(i32::from(unread), 0);
    }

    #[tokio::test]
    async fn sender_cannot_mark_read() {
        let (svc, _) =
            Service::new(crate::spec::config(b"s"), Memory::new());
        let (alice, bob) = (user::Id::new(), user::Id::new());
        let msg = svc
            .execute(SendMessage::from(form(alice, bob)))
            .await
            .unwrap();

        let err = svc
            .execute(MarkMessageRead {
                message_id: msg.id,
                reader_id: alice,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NotReceiver(_)));
    }
}
