#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Terminal outcome of one send call.
pub enum DeliveryStatus {
    /// Gateway accepted the message (HTTP 200/201, parseable body).
    Delivered,
    /// The client is disabled; no network call was made.
    Disabled,
    /// Gateway answered with a non-retryable HTTP status.
    Rejected,
    /// Every attempt in the retry budget failed with a transient error.
    Exhausted,
    /// The caller cancelled the client while it waited to retry.
    Cancelled,
    /// Gateway reported success but the body was not valid JSON.
    MalformedResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a send call, immutable once produced.
///
/// Delivery failures are values, not errors: every terminal path yields a
/// report whose `detail` names the status code, response body, or underlying
/// error text. `attempts` is 0 for the disabled short-circuit and counts
/// from 1 otherwise.
pub struct SendReport {
    pub status: DeliveryStatus,
    pub detail: String,
    pub message_id: Option<String>,
    pub attempts: u32,
}

impl SendReport {
    /// Whether the gateway accepted the message.
    pub fn success(&self) -> bool {
        self.status == DeliveryStatus::Delivered
    }

    pub(crate) fn delivered(message_id: Option<String>, detail: String, attempts: u32) -> Self {
        Self {
            status: DeliveryStatus::Delivered,
            detail,
            message_id,
            attempts,
        }
    }

    pub(crate) fn failure(status: DeliveryStatus, detail: String, attempts: u32) -> Self {
        Self {
            status,
            detail,
            message_id: None,
            attempts,
        }
    }
}
