use crate::domain::validation::ValidationError;
use crate::domain::value::{MessageText, Recipient};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One outbound send: a non-empty, ordered recipient list and a message.
///
/// Single and bulk sends share the wire shape: recipients are joined with
/// `,` into the `number` field, preserving the order given here.
pub struct SendMessage {
    recipients: Vec<Recipient>,
    message: MessageText,
}

impl SendMessage {
    /// Build a request for one recipient.
    pub fn single(recipient: Recipient, message: MessageText) -> Self {
        Self {
            recipients: vec![recipient],
            message,
        }
    }

    /// Build a request for several recipients, rejecting an empty list.
    pub fn bulk(
        recipients: Vec<Recipient>,
        message: MessageText,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::Empty {
                field: Recipient::FIELD,
            });
        }
        Ok(Self {
            recipients,
            message,
        })
    }

    /// Recipients in the order they will appear in the `number` field.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// The message text.
    pub fn message(&self) -> &MessageText {
        &self.message
    }
}
