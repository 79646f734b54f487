//! Domain layer: validated value types and the request/report shapes (no I/O).

mod request;
mod response;
mod validation;
mod value;

pub use request::SendMessage;
pub use response::{DeliveryStatus, SendReport};
pub use validation::ValidationError;
pub use value::{ApiKey, MessageText, Recipient, SenderName};
