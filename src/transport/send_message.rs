use serde::Deserialize;
use serde_json::Value;

use crate::domain::{ApiKey, MessageText, Recipient, SendMessage, SenderName};

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Provider message id returned by Semaphore as either JSON string or JSON
/// number. Numeric ids are preserved via their exact decimal form.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TransportMessageId(String);

impl TransportMessageId {
    fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for TransportMessageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::String(id) => Ok(Self(id)),
            Value::Number(id) => Ok(Self(id.to_string())),
            _ => Err(serde::de::Error::custom(
                "expected message_id to be JSON string or number",
            )),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct MessageJsonEntry {
    #[serde(default)]
    message_id: Option<TransportMessageId>,
}

/// Encode the request body: an ordered JSON object carrying `apikey`,
/// `number` (normalized recipients joined with `,`, input order preserved),
/// `message`, and `sendername` only when one is configured.
pub fn encode_send_message_body(
    api_key: &ApiKey,
    sender: Option<&SenderName>,
    request: &SendMessage,
) -> String {
    let number = request
        .recipients()
        .iter()
        .map(Recipient::msisdn)
        .collect::<Vec<_>>()
        .join(",");

    let mut body = serde_json::Map::new();
    body.insert(
        ApiKey::FIELD.to_owned(),
        Value::String(api_key.as_str().to_owned()),
    );
    body.insert(Recipient::FIELD.to_owned(), Value::String(number));
    body.insert(
        MessageText::FIELD.to_owned(),
        Value::String(request.message().as_str().to_owned()),
    );
    if let Some(sender) = sender {
        body.insert(
            SenderName::FIELD.to_owned(),
            Value::String(sender.as_str().to_owned()),
        );
    }

    Value::Object(body).to_string()
}

/// Decode a success body into the optional provider message id.
///
/// The gateway answers with a single object or an array of per-message
/// objects; the first entry's `message_id` wins. Any other JSON shape is
/// still success, just without an id. A body that does not parse at all is
/// a [`TransportError`]; the gateway already accepted the request by then,
/// so callers must not retry.
pub fn decode_send_message_response(json: &str) -> Result<Option<String>, TransportError> {
    let parsed: Value = serde_json::from_str(json)?;
    let message_id = match parsed {
        Value::Object(entry) => decode_entry(Value::Object(entry)),
        Value::Array(entries) => entries.into_iter().next().and_then(decode_entry),
        _ => None,
    };
    Ok(message_id)
}

fn decode_entry(value: Value) -> Option<String> {
    serde_json::from_value::<MessageJsonEntry>(value)
        .ok()
        .and_then(|entry| entry.message_id)
        .map(TransportMessageId::into_string)
}

#[cfg(test)]
mod tests {
    use crate::domain::MessageText;

    use super::*;

    fn request(recipients: &[&str], message: &str) -> SendMessage {
        let recipients = recipients
            .iter()
            .map(|raw| Recipient::new(*raw).unwrap())
            .collect::<Vec<_>>();
        SendMessage::bulk(recipients, MessageText::new(message).unwrap()).unwrap()
    }

    #[test]
    fn encode_orders_fields_and_joins_recipients() {
        let body = encode_send_message_body(
            &ApiKey::new("test_key"),
            None,
            &request(&["09171111111", "09172222222"], "hi"),
        );
        assert_eq!(
            body,
            r#"{"apikey":"test_key","number":"639171111111,639172222222","message":"hi"}"#
        );
    }

    #[test]
    fn encode_appends_sender_name_when_configured() {
        let sender = SenderName::new("RMCRS").unwrap();
        let body = encode_send_message_body(
            &ApiKey::new("test_key"),
            Some(&sender),
            &request(&["09171234567"], "rent due"),
        );
        assert_eq!(
            body,
            r#"{"apikey":"test_key","number":"639171234567","message":"rent due","sendername":"RMCRS"}"#
        );
    }

    #[test]
    fn decode_extracts_string_message_id_from_object() {
        let id = decode_send_message_response(r#"{"message_id":"abc"}"#).unwrap();
        assert_eq!(id.as_deref(), Some("abc"));
    }

    #[test]
    fn decode_extracts_first_entry_from_array_and_stringifies_numbers() {
        let json = r#"[{"message_id":183920210,"status":"Pending"},{"message_id":183920211}]"#;
        let id = decode_send_message_response(json).unwrap();
        assert_eq!(id.as_deref(), Some("183920210"));
    }

    #[test]
    fn decode_accepts_json_without_a_message_id() {
        assert_eq!(decode_send_message_response("{}").unwrap(), None);
        assert_eq!(decode_send_message_response("[]").unwrap(), None);
        assert_eq!(decode_send_message_response(r#""queued""#).unwrap(), None);
        assert_eq!(
            decode_send_message_response(r#"{"message_id":true}"#).unwrap(),
            None
        );
    }

    #[test]
    fn decode_rejects_non_json_bodies() {
        let err = decode_send_message_response("{ not json }").unwrap_err();
        assert!(matches!(err, TransportError::Json(_)));
    }
}
