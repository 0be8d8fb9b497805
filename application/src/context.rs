//! [`Context`]-related definitions.

use std::sync::atomic::{self, AtomicU16};

use axum::{async_trait, extract::FromRequestParts, RequestPartsExt as _};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use common::DateTime;
use juniper::{
    http::{GraphQLBatchResponse, GraphQLResponse},
    IntoFieldError as _,
};
use service::{
    command::{self, Command as _},
    domain::user::session,
};
use tokio::sync::OnceCell;

use crate::{api, define_error, AsError, Error, JuniperResponse, Service};

/// Name of the GraphQL subscription variable carrying the access token.
const AUTH_TOKEN_VARIABLE: &str = "authToken";

/// Context of a single GraphQL request (or subscription connection).
#[derive(Debug)]
pub struct Context {
    /// [`Service`] instance.
    service: Service,

    /// HTTP status code of the response, if it contains errors.
    error_status_code: AtomicU16,

    /// Parts of the HTTP request.
    parts: http::request::Parts,

    /// Outcome of authenticating the request, resolved on first demand.
    session: OnceCell<Result<Session, Error>>,
}

impl Context {
    /// Returns [`Service`] instance of this [`Context`].
    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// Returns the HTTP status code of the response, if it contains errors.
    #[must_use]
    pub fn error_status_code(&self) -> http::StatusCode {
        http::StatusCode::from_u16(
            self.error_status_code.load(atomic::Ordering::Relaxed),
        )
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Helper method remembering the status code of an [`Error`] inside
    /// [`Result::map_err()`] closure.
    pub fn error(&self) -> impl FnOnce(Error) -> Error + '_ {
        move |err| {
            self.error_status_code
                .store(err.status_code.as_u16(), atomic::Ordering::Relaxed);
            err
        }
    }

    /// Returns the [`Session`] the current request is authenticated with.
    ///
    /// The request is authenticated only once, so the following calls
    /// return the same outcome.
    ///
    /// # Errors
    ///
    /// Errors if:
    /// - the current request carries no access token;
    /// - the provided access token is invalid or expired.
    pub async fn current_session(&self) -> Result<Session, Error> {
        self.session
            .get_or_init(|| async {
                self.authenticate().await.map_err(self.error())
            })
            .await
            .clone()
    }

    /// Applies the [`juniper::Variables`] provided by the client on GraphQL
    /// subscription initialization.
    ///
    /// The access token may be passed via the `authToken` variable, as
    /// browsers cannot set headers of WebSocket requests.
    ///
    /// # Errors
    ///
    /// Errors if the provided variables are invalid.
    pub(crate) fn apply_subscription_variables(
        &mut self,
        vars: &juniper::Variables,
    ) -> Result<(), Error> {
        let Some(token) = vars.get(AUTH_TOKEN_VARIABLE) else {
            return Ok(());
        };
        let header = token
            .as_string_value()
            .and_then(|t| {
                format!("Bearer {t}").parse::<http::HeaderValue>().ok()
            })
            .ok_or_else(|| Error::from(AuthError::InvalidVariables))?;
        drop(self.parts.headers.insert(http::header::AUTHORIZATION, header));
        Ok(())
    }

    /// Authenticates the current request by its bearer access token.
    async fn authenticate(&self) -> Result<Session, Error> {
        let TypedHeader(Authorization(bearer)) = self
            .parts
            .clone()
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                if e.is_missing() {
                    Error::from(AuthError::AuthorizationRequired)
                } else {
                    e.into_error()
                }
            })?;

        let session = self
            .service
            .execute(command::AuthorizeUserSession {
                token: session::Token::from(bearer.token().to_owned()),
            })
            .await
            .map_err(AsError::into_error)?;

        Ok(Session {
            user_id: session.user_id.into(),
            expires_at: session.expires_at.coerce(),
        })
    }
}

impl juniper::Context for Context {}

#[async_trait]
impl<S> FromRequestParts<S> for Context
where
    S: Send + Sync,
{
    type Rejection = JuniperResponse;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                JuniperResponse {
                    status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
                    response: GraphQLBatchResponse::Single(
                        GraphQLResponse::error(
                            Error::internal(&"missing `Service` extension")
                                .into_field_error(),
                        ),
                    ),
                }
            })?;

        Ok(Self {
            service,
            error_status_code: AtomicU16::new(
                http::StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            ),
            parts: parts.clone(),
            session: OnceCell::new(),
        })
    }
}

/// Authenticated session of a marketplace user.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// ID of the user authenticated by this [`Session`].
    pub user_id: api::user::Id,

    /// [`DateTime`] when this [`Session`] expires.
    pub expires_at: DateTime,
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(if self.is_expired() {
            AuthError::SessionExpired.into()
        } else {
            AuthError::InvalidToken.into()
        })
    }
}

define_error! {
    enum AuthError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Access token is invalid"]
        InvalidToken,

        #[code = "SESSION_EXPIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Session has expired"]
        SessionExpired,

        #[code = "INVALID_VARIABLES"]
        #[status = BAD_REQUEST]
        #[message = "Invalid subscription authorization variables"]
        InvalidVariables,
    }
}
