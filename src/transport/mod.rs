//! Transport layer: the gateway's JSON wire format (encoding and decoding).

mod send_message;

pub use send_message::{TransportError, decode_send_message_response, encode_send_message_body};
