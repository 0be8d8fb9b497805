//! [`Message`] form.

use crate::{
    domain::{self, listing, message, user},
    validation::{Errors, Validate},
};

/// Form sending a new [`domain::Message`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    /// Sender of the message.
    pub sender_id: user::Id,

    /// Receiver of the message.
    pub receiver_id: user::Id,

    /// Listing the message is about, if any.
    pub listing_id: Option<listing::Id>,

    /// Text of the message.
    pub body: String,
}

impl Validate for Message {
    fn validate(&self) -> Errors {
        let mut errors = Errors::new();

        _ = errors
            .field("body", &self.body)
            .required("Message cannot be empty")
            .max_chars(
                message::Body::MAX_LEN,
                "Message must be at most 1000 characters",
            );
        if self.sender_id == self.receiver_id {
            errors.add("receiver_id", "You cannot message yourself");
        }

        errors
    }
}

impl Message {
    /// Validates this [`Message`] form and turns it into a new unread
    /// [`domain::Message`].
    ///
    /// # Errors
    ///
    /// If this [`Message`] form is invalid.
    pub fn into_message(self) -> Result<domain::Message, Errors> {
        self.validate().into_result()?;

        let body = message::Body::new(self.body.trim()).ok_or_else(|| {
            let mut errors = Errors::new();
            errors.add("body", "Invalid value");
            errors
        })?;
        Ok(domain::Message {
            id: message::Id::new(),
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            listing_id: self.listing_id,
            body,
            read: false,
            created_at: message::CreationDateTime::now(),
        })
    }
}

#[cfg(test)]
mod spec {
    use crate::{domain::user, validation::Validate as _};

    use super::Message;

    fn form(body: &str) -> Message {
        Message {
            sender_id: user::Id::new(),
            receiver_id: user::Id::new(),
            listing_id: None,
            body: body.into(),
        }
    }

    #[test]
    fn requires_body() {
        assert_eq!(
            form("  ").validate().get("body"),
            Some("Message cannot be empty"),
        );
        assert!(form("Still available?").validate().is_empty());
    }

    #[test]
    fn limits_body() {
        assert_eq!(
            form(&"a".repeat(1001)).validate().get("body"),
            Some("Message must be at most 1000 characters"),
        );
    }

    #[test]
    fn forbids_messaging_yourself() {
        let me = user::Id::new();
        let form = Message {
            sender_id: me,
            receiver_id: me,
            ..form("Hi")
        };

        assert_eq!(
            form.validate().get("receiver_id"),
            Some("You cannot message yourself"),
        );
        assert!(form.into_message().is_err());
    }

    #[test]
    fn converts_into_unread_message() {
        let msg = form(" Still available? ").into_message().unwrap();

        assert_eq!(AsRef::<str>::as_ref(&msg.body), "Still available?");
        assert!(!msg.read);
    }
}
