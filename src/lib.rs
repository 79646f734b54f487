//! Typed Rust client for the Semaphore SMS HTTP API.
//!
//! The crate is layered: a domain layer of strong types (Philippine mobile
//! numbers, message text), a transport layer for the wire format, and a
//! client layer that drives each send through a small retry loop and reports
//! the outcome instead of failing.
//!
//! ```rust,no_run
//! use semaphore_sms::SemaphoreClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), semaphore_sms::ValidationError> {
//!     let client = SemaphoreClient::new("your-api-key");
//!     let report = client.send_one("09171234567", "Appointment at 10:00").await?;
//!     if !report.success() {
//!         eprintln!("not delivered: {}", report.detail);
//!     }
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod domain;
mod transport;

pub use client::{BuildError, SemaphoreClient, SemaphoreClientBuilder};
pub use domain::{
    ApiKey, DeliveryStatus, MessageText, Recipient, SendMessage, SendReport, SenderName,
    ValidationError,
};
