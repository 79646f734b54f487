//! Client layer: the high-level [`SemaphoreClient`], its builder, and the
//! retrying dispatcher that drives each send through the transport layer.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::{
    ApiKey, DeliveryStatus, MessageText, Recipient, SendMessage, SendReport, SenderName,
    ValidationError,
};
use crate::transport;

const DEFAULT_ENDPOINT: &str = "https://api.semaphore.co/api/v4/messages";

/// Total attempt budget per send, counting the first try.
const MAX_ATTEMPTS: u32 = 3;

/// Fixed wait between attempts.
const RETRY_DELAY: Duration = Duration::from_millis(2000);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_json<'a>(
        &'a self,
        url: &'a str,
        body: &'a str,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .header(reqwest::header::ACCEPT, "application/json")
                .body(body.to_owned())
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

trait Delay: Send + Sync {
    fn wait(&self, duration: Duration) -> BoxFuture<'_, ()>;
}

#[derive(Debug, Clone)]
struct TokioDelay;

impl Delay for TokioDelay {
    fn wait(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Accepted,
    Transient,
    Fatal,
}

/// 200 and 201 mean the gateway accepted the message. 5xx and 429 are worth
/// another try. Everything else is a hard reject.
fn classify_status(status: u16) -> StatusClass {
    match status {
        200 | 201 => StatusClass::Accepted,
        429 => StatusClass::Transient,
        s if s >= 500 => StatusClass::Transient,
        _ => StatusClass::Fatal,
    }
}

/// Failure to construct the underlying HTTP client.
#[derive(Debug, thiserror::Error)]
#[error("failed to build http transport: {0}")]
pub struct BuildError(#[source] Box<dyn StdError + Send + Sync>);

/// Builder for [`SemaphoreClient`].
///
/// Lets you attach a sender name, point the client at a different endpoint,
/// and tune the HTTP transport.
#[derive(Debug, Clone)]
pub struct SemaphoreClientBuilder {
    api_key: ApiKey,
    sender: Option<SenderName>,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    cancel: CancellationToken,
    enabled: bool,
}

impl SemaphoreClientBuilder {
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = ApiKey::new(api_key);
        let enabled = !api_key.is_blank();
        Self {
            api_key,
            sender: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            cancel: CancellationToken::new(),
            enabled,
        }
    }

    /// Sender name shown to recipients. A blank value means no sender name.
    pub fn sender_name(mut self, sender: impl Into<String>) -> Self {
        self.sender = SenderName::opt(sender);
        self
    }

    /// Override the gateway endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// HTTP timeout applied to each individual attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom `User-Agent` header for gateway requests.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Token observed while waiting between attempts. Cancelling it makes an
    /// in-flight send give up instead of retrying.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Start the client switched off even when the API key is present.
    /// A blank key forces the client off regardless of this setting.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn build(self) -> Result<SemaphoreClient, BuildError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder
            .build()
            .map_err(|err| BuildError(Box::new(err)))?;

        let enabled = self.enabled && !self.api_key.is_blank();
        Ok(SemaphoreClient {
            api_key: self.api_key,
            sender: self.sender,
            endpoint: self.endpoint,
            enabled: Arc::new(AtomicBool::new(enabled)),
            http: Arc::new(ReqwestTransport { client }),
            delay: Arc::new(TokioDelay),
            cancel: self.cancel,
        })
    }
}

/// High-level client for the Semaphore SMS gateway.
///
/// One send runs validate, encode, dispatch with retries, decode, and comes
/// back as a [`SendReport`]. Only invalid input is an `Err`; every delivery
/// outcome, including failure after retries, is an `Ok` report.
///
/// The client is cheap to clone. Clones share the HTTP connection pool and
/// the enabled flag.
#[derive(Clone)]
pub struct SemaphoreClient {
    api_key: ApiKey,
    sender: Option<SenderName>,
    endpoint: String,
    enabled: Arc<AtomicBool>,
    http: Arc<dyn HttpTransport>,
    delay: Arc<dyn Delay>,
    cancel: CancellationToken,
}

impl SemaphoreClient {
    /// Create a client with the default endpoint and no sender name.
    ///
    /// A blank API key is tolerated: the client constructs fine but starts
    /// disabled and every send reports [`DeliveryStatus::Disabled`].
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = ApiKey::new(api_key);
        let enabled = !api_key.is_blank();
        Self {
            api_key,
            sender: None,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            enabled: Arc::new(AtomicBool::new(enabled)),
            http: Arc::new(ReqwestTransport {
                client: reqwest::Client::new(),
            }),
            delay: Arc::new(TokioDelay),
            cancel: CancellationToken::new(),
        }
    }

    pub fn builder(api_key: impl Into<String>) -> SemaphoreClientBuilder {
        SemaphoreClientBuilder::new(api_key)
    }

    /// Whether sends currently go out to the gateway.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Switch sending on or off at runtime. A blank API key clamps the flag
    /// to off, so a client without credentials can never be enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled
            .store(enabled && !self.api_key.is_blank(), Ordering::Relaxed);
    }

    /// Send one message to one recipient.
    ///
    /// The recipient may be in any local form ("0917...", "917...") and is
    /// normalized to its international form before the request goes out.
    pub async fn send_one(
        &self,
        recipient: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<SendReport, ValidationError> {
        if let Some(report) = self.disabled_report() {
            return Ok(report);
        }
        let recipient = Recipient::new(recipient)?;
        let message = MessageText::new(message)?;
        Ok(self.dispatch(&SendMessage::single(recipient, message)).await)
    }

    /// Send one message to several recipients in a single gateway request.
    pub async fn send_bulk<I, S>(
        &self,
        recipients: I,
        message: impl Into<String>,
    ) -> Result<SendReport, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(report) = self.disabled_report() {
            return Ok(report);
        }
        let recipients = recipients
            .into_iter()
            .map(Recipient::new)
            .collect::<Result<Vec<_>, _>>()?;
        let message = MessageText::new(message)?;
        Ok(self.dispatch(&SendMessage::bulk(recipients, message)?).await)
    }

    /// Send an already-validated request.
    pub async fn send(&self, request: &SendMessage) -> SendReport {
        if let Some(report) = self.disabled_report() {
            return report;
        }
        self.dispatch(request).await
    }

    fn disabled_report(&self) -> Option<SendReport> {
        if self.is_enabled() {
            return None;
        }
        debug!("sms sending is disabled, skipping");
        Some(SendReport::failure(
            DeliveryStatus::Disabled,
            "sms sending is disabled".to_owned(),
            0,
        ))
    }

    /// Drive one request through up to [`MAX_ATTEMPTS`] transport calls with
    /// a fixed [`RETRY_DELAY`] between them.
    async fn dispatch(&self, request: &SendMessage) -> SendReport {
        if request.message().exceeds_single_segment() {
            warn!(
                chars = request.message().as_str().chars().count(),
                "message exceeds one sms segment, the gateway may split it"
            );
        }

        let body =
            transport::encode_send_message_body(&self.api_key, self.sender.as_ref(), request);

        let mut last_error = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            match self.http.post_json(&self.endpoint, &body).await {
                Ok(response) => match classify_status(response.status) {
                    StatusClass::Accepted => {
                        return match transport::decode_send_message_response(&response.body) {
                            Ok(message_id) => SendReport::delivered(
                                message_id,
                                format!("accepted by gateway (HTTP {})", response.status),
                                attempt,
                            ),
                            // The gateway already took the message, so a
                            // retry here would deliver it twice.
                            Err(err) => SendReport::failure(
                                DeliveryStatus::MalformedResponse,
                                format!("gateway accepted but sent an unreadable body: {err}"),
                                attempt,
                            ),
                        };
                    }
                    StatusClass::Fatal => {
                        return SendReport::failure(
                            DeliveryStatus::Rejected,
                            format!(
                                "gateway rejected the request: HTTP {}: {}",
                                response.status, response.body
                            ),
                            attempt,
                        );
                    }
                    StatusClass::Transient => {
                        last_error = format!("HTTP {}: {}", response.status, response.body);
                    }
                },
                // A timed-out attempt may still have reached the gateway, so
                // a retry can deliver the same message twice.
                Err(err) => last_error = err.to_string(),
            }

            if attempt == MAX_ATTEMPTS {
                break;
            }

            warn!(attempt, error = %last_error, "send attempt failed, retrying");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return SendReport::failure(
                        DeliveryStatus::Cancelled,
                        format!("cancelled while waiting to retry after attempt {attempt}"),
                        attempt,
                    );
                }
                _ = self.delay.wait(RETRY_DELAY) => {}
            }
        }

        SendReport::failure(
            DeliveryStatus::Exhausted,
            format!("giving up after {MAX_ATTEMPTS} attempts: {last_error}"),
            MAX_ATTEMPTS,
        )
    }
}
