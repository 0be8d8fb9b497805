//! [`Error`]-related definitions.

use std::fmt;

use axum_extra::typed_header::TypedHeaderRejection;
use derive_more::Error as StdError;
use itertools::Itertools as _;
use juniper::IntoFieldError;
use service::{
    infra::database::{self, memory, postgres},
    validation,
};
use tracerr::{Trace, Traced};

/// Defines a new error type.
#[expect(clippy::module_name_repetitions, reason = "more readable")]
#[macro_export]
macro_rules! define_error {
    (
        enum $name:ident {
            $(
                #[code = $code:literal]
                #[status = $status_code:ident]
                #[message = $message:literal]
                $variant:ident
            ),* $(,)?
        }
    ) => {
        /// Error type.
        #[derive(
            Clone,
            Copy,
            Debug,
            ::derive_more::Display,
            ::derive_more::Error
        )]
        #[repr(u16)]
        pub enum $name {
            $(
                #[display($message)]
                #[doc = $message]
                $variant,
            )*
        }

        impl From<$name> for $crate::Error {
            fn from(err: $name) -> Self {
                match err {
                    $(
                        $name::$variant => Self {
                            code: $code,
                            status_code: ::http::StatusCode::$status_code,
                            message: $message.to_string(),
                            backtrace: None,
                            fields: None,
                        },
                    )*
                }
            }
        }
    };
}

/// GraphQL API [`Error`].
#[derive(Clone, Debug, StdError)]
pub struct Error {
    /// [`Error`] code.
    pub code: Code,

    /// [`http::StatusCode`] of this [`Error`].
    pub status_code: http::StatusCode,

    /// Backtrace of this [`Error`].
    #[error(not(backtrace))]
    pub backtrace: Option<Trace>,

    /// [`Error`] message.
    pub message: String,

    /// Error messages of the invalid input fields, if any.
    pub fields: Option<validation::Errors>,
}

impl Error {
    /// Create a new [`Error`] representing an internal server error.
    #[must_use]
    pub fn internal(msg: &impl ToString) -> Self {
        Self {
            code: "INTERNAL_SERVER_ERROR",
            status_code: http::StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            backtrace: None,
            fields: None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            code,
            status_code: _,
            backtrace,
            message,
            fields: _,
        } = self;

        write!(
            f,
            "[{code}]: {message}{}",
            backtrace
                .iter()
                .format_with("\n", |trace, f| f(&format_args!("{trace}"))),
        )
    }
}

impl<S> IntoFieldError<S> for Error
where
    S: From<String>,
{
    fn into_field_error(self) -> juniper::FieldError<S> {
        let mut ext = juniper::Object::with_capacity(3);
        drop(
            ext.add_field("code", juniper::Value::scalar(self.code.to_owned())),
        );
        drop(
            ext.add_field(
                "backtrace",
                juniper::Value::list(
                    self.backtrace
                        .iter()
                        .flat_map(|trace| trace.iter())
                        .map(|frame| juniper::Value::scalar(frame.to_string()))
                        .collect(),
                ),
            ),
        );
        if let Some(fields) = &self.fields {
            drop(ext.add_field(
                "fields",
                juniper::Value::object(
                    fields
                        .iter()
                        .map(|(f, m)| (f, juniper::Value::scalar(m.to_owned())))
                        .collect(),
                ),
            ));
        }
        juniper::FieldError::new(self.message, juniper::Value::object(ext))
    }
}

/// [`Error`] code.
pub type Code = &'static str;

/// Helper trait for converting types into [`Error`]s.
pub trait AsError {
    /// Tries to convert the type into an [`Error`].
    ///
    /// [`None`] is returned if the type cannot be converted into an [`Error`].
    fn try_as_error(&self) -> Option<Error>;

    /// Converts the type into an [`Error`].
    fn as_error(&self) -> Error
    where
        Self: fmt::Display,
    {
        self.try_as_error()
            .unwrap_or_else(|| Error::internal(&self))
    }

    /// Converts the type into an [`Error`] by consuming it.
    fn into_error(self) -> Error
    where
        Self: fmt::Display + Sized,
    {
        self.as_error()
    }
}

impl<E: AsError> AsError for Traced<E> {
    fn try_as_error(&self) -> Option<Error> {
        let mut error = self.as_ref().try_as_error()?;
        error.backtrace = Some(self.trace().clone());
        Some(error)
    }
}

impl AsError for TypedHeaderRejection {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "BAD_REQUEST",
            status_code: http::StatusCode::BAD_REQUEST,
            message: self.to_string(),
            backtrace: None,
            fields: None,
        })
    }
}

impl AsError for validation::Errors {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error {
            code: "VALIDATION_FAILED",
            status_code: http::StatusCode::BAD_REQUEST,
            message: "Submitted form is invalid".to_owned(),
            backtrace: None,
            fields: Some(self.clone()),
        })
    }
}

impl AsError for database::Error {
    fn try_as_error(&self) -> Option<Error> {
        let unavailable = match self {
            Self::Memory(e) => matches!(e, memory::Error::Unavailable),
            Self::Postgres(e) => matches!(
                e,
                postgres::Error::Checkout(_) | postgres::Error::PoolCreation(_),
            ),
        };
        unavailable.then(|| StorageError::Unavailable.into())
    }
}

define_error! {
    enum StorageError {
        #[code = "STORAGE_UNAVAILABLE"]
        #[status = SERVICE_UNAVAILABLE]
        #[message = "Storage is temporarily unavailable, try again later"]
        Unavailable,
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, IntoFieldError};
    use service::{
        infra::database::{self, memory},
        validation,
    };

    use super::AsError as _;

    #[test]
    fn exposes_invalid_fields() {
        let mut errors = validation::Errors::new();
        errors.add("title", "Title is required");
        errors.add("price", "Price must be a valid positive number");

        let err = errors.into_error();
        assert_eq!(err.code, "VALIDATION_FAILED");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);

        let field =
            IntoFieldError::<DefaultScalarValue>::into_field_error(err);
        let fields = field
            .extensions()
            .as_object_value()
            .and_then(|ext| ext.get_field_value("fields"))
            .and_then(|f| f.as_object_value())
            .unwrap();
        assert_eq!(
            fields
                .get_field_value("title")
                .and_then(|m| m.as_string_value()),
            Some("Title is required"),
        );
        assert_eq!(fields.field_count(), 2);
    }

    #[test]
    fn reports_unavailable_storage() {
        let err =
            database::Error::from(memory::Error::Unavailable).into_error();
        assert_eq!(err.code, "STORAGE_UNAVAILABLE");
        assert_eq!(err.status_code, http::StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.fields.is_none());

        let err = database::Error::from(memory::Error::Poisoned).into_error();
        assert_eq!(err.code, "INTERNAL_SERVER_ERROR");
    }
}
