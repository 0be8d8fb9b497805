//! [`Profile`]-related [`Database`] implementations.

use common::operations::{By, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{profile, user, Profile},
    infra::{
        database::{self, postgres::Connection as _, Postgres},
        Database,
    },
};

/// Decodes a [`Profile`] out of the provided [`Row`].
fn decode(row: &Row) -> Profile {
    Profile {
        user_id: row.get("user_id"),
        full_name: row.get("full_name"),
        username: row.get("username"),
        bio: row.get("bio"),
        phone: row.get("phone"),
    }
}

impl Database<Select<By<Option<Profile>, user::Id>>> for Postgres {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let user_id: user::Id = by.into_inner();

        const SQL: &str = "\
            SELECT user_id, full_name, username, bio, phone \
            FROM profiles \
            WHERE user_id = $1::UUID \
            LIMIT 1";
        self.query_opt(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl Database<Select<By<Option<Profile>, profile::Username>>> for Postgres {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, profile::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let username: profile::Username = by.into_inner();

        const SQL: &str = "\
            SELECT user_id, full_name, username, bio, phone \
            FROM profiles \
            WHERE LOWER(username) = LOWER($1::VARCHAR) \
            LIMIT 1";
        self.query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(decode))
    }
}

impl Database<Update<Profile>> for Postgres {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(profile): Update<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        let Profile {
            user_id,
            full_name,
            username,
            bio,
            phone,
        } = profile;

        const SQL: &str = "\
            INSERT INTO profiles (\
                user_id, full_name, username, bio, phone \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, $5::VARCHAR \
            ) \
            ON CONFLICT (user_id) DO UPDATE \
            SET full_name = EXCLUDED.full_name, \
                username = EXCLUDED.username, \
                bio = EXCLUDED.bio, \
                phone = EXCLUDED.phone";
        self.exec(SQL, &[&user_id, &full_name, &username, &bio, &phone])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
