//! [`Command`] for authorizing a [`Session`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`Session`] by its [`session::Token`].
///
/// Tokens are issued by the authentication provider, so only their signature
/// and expiration are checked.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let AuthorizeUserSession { token } = cmd;

        jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(tracerr::from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

impl ExecutionError {
    /// Indicates whether the [`session::Token`] is genuine, but has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        match self {
            Self::JsonWebTokenDecodeError(e) => matches!(
                e.kind(),
                jsonwebtoken::errors::ErrorKind::ExpiredSignature,
            ),
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use jsonwebtoken::{EncodingKey, Header};

    use crate::{
        domain::user::{self, session, Session},
        infra::Memory,
        Command as _, Service,
    };

    use super::AuthorizeUserSession;

    const SECRET: &[u8] = b"top-secret";

    fn token(session: &Session) -> session::Token {
        let token = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        token.parse().unwrap()
    }

    #[tokio::test]
    async fn decodes_valid_token() {
        let (svc, _) = Service::new(crate::spec::config(SECRET), Memory::new());
        let session = Session {
            user_id: user::Id::new(),
            expires_at: session::ExpirationDateTime::now()
                + Duration::from_secs(60),
        };

        let authorized = svc
            .execute(AuthorizeUserSession::from(token(&session)))
            .await
            .unwrap();

        assert_eq!(authorized.user_id, session.user_id);
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let (svc, _) = Service::new(crate::spec::config(SECRET), Memory::new());
        let session = Session {
            user_id: user::Id::new(),
            expires_at: session::ExpirationDateTime::from_unix_timestamp(
                1_000_000,
            )
            .unwrap(),
        };

        let err = svc
            .execute(AuthorizeUserSession::from(token(&session)))
            .await
            .unwrap_err();

        assert!(err.as_ref().is_expired());
    }

    #[tokio::test]
    async fn rejects_foreign_signature() {
        let (svc, _) =
            Service::new(crate::spec::config(b"another"), Memory::new());
        let session = Session {
            user_id: user::Id::new(),
            expires_at: session::ExpirationDateTime::now()
                + Duration::from_secs(60),
        };

        let err = svc
            .execute(AuthorizeUserSession::from(token(&session)))
            .await
            .unwrap_err();

        assert!(!err.as_ref().is_expired());
    }
}
