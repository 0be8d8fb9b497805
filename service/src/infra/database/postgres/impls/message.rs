//! [`Message`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{message, user, Message},
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
    read,
};

impl Database<Select<By<Option<Message>, message::Id>>> for Postgres {
    type Ok = Option<Message>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Message>, message::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: message::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, sender_id, receiver_id, listing_id, body, read, \
                   created_at \
            FROM messages \
            WHERE id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| {
                row.map(|row| Message {
                    id: row.get("id"),
                    sender_id: row.get("sender_id"),
                    receiver_id: row.get("receiver_id"),
                    listing_id: row.get("listing_id"),
                    body: row.get("body"),
                    read: row.get("read"),
                    created_at: row.get("created_at"),
                })
            })
    }
}

impl Database<Insert<Message>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(msg): Insert<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(msg)).await.map_err(tracerr::wrap!())
    }
}

/// Notifications about the upserted [`Message`] are sent by the
/// `messages_notify` trigger.
impl Database<Update<Message>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(msg): Update<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let Message {
            id,
            sender_id,
            receiver_id,
            listing_id,
            body,
            read,
            created_at,
        } = msg;

        const SQL: &str = "\
            INSERT INTO messages (\
                id, sender_id, receiver_id, listing_id, \
                body, read, created_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::VARCHAR, $6::BOOL, $7::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET body = EXCLUDED.body, \
                read = EXCLUDED.read";
        self.exec(
            SQL,
            &[
                &id,
                &sender_id,
                &receiver_id,
                &listing_id,
                &body,
                &read,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl Database<Select<By<read::message::unread::Count, user::Id>>>
    for Postgres
{
    type Ok = read::message::unread::Count;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<read::message::unread::Count, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let receiver_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT COUNT(*)::INT4 \
            FROM messages \
            WHERE receiver_id = $1::UUID \
              AND NOT read";
        self.query_opt(SQL, &[&receiver_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.map_or(0, |r| r.get::<_, i32>(0)).into())
    }
}
