use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};

use super::events::{EventDispatcher, Flow, SendEvent, SendListener};
use super::payload::{ErrorResponse, MessageEncoder, PostmarkEncoder, Receipt};
use super::{Delivery, Transport};
use crate::config::{PostmarkSettings, POSTMARK_ENDPOINT};
use crate::error::{MailError, Result};
use crate::message::Message;

const SERVER_TOKEN_HEADER: &str = "x-postmark-server-token";

/// Open HTTP client bound to the send endpoint
struct Connection {
    client: Client,
    endpoint: String,
}

impl Connection {
    /// TLS goes through rustls and is verified against the bundled webpki
    /// root store, never the host's certificate store.
    fn open(endpoint: &str, api_key: &str) -> Result<Self> {
        let mut token = HeaderValue::from_str(api_key).map_err(|_| {
            MailError::Config("Postmark API key contains invalid characters".to_string())
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(HeaderName::from_static(SERVER_TOKEN_HEADER), token);

        let client = Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn post(&self, body: String) -> RequestBuilder {
        self.client.post(&self.endpoint).body(body)
    }
}

/// Transport posting messages to the Postmark `/email` API
pub struct PostmarkTransport {
    api_key: Option<String>,
    endpoint: String,
    connection: Option<Connection>,
    dispatcher: EventDispatcher,
    encoder: Box<dyn MessageEncoder>,
}

impl Default for PostmarkTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl PostmarkTransport {
    pub fn new() -> Self {
        Self {
            api_key: None,
            endpoint: POSTMARK_ENDPOINT.to_string(),
            connection: None,
            dispatcher: EventDispatcher::new(),
            encoder: Box::new(PostmarkEncoder),
        }
    }

    pub fn from_settings(settings: &PostmarkSettings) -> Self {
        let mut transport = Self::new().with_endpoint(settings.endpoint.clone());
        transport.api_key = settings.api_key.clone();
        transport
    }

    /// Takes effect on the next connection; an open one keeps its token.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = Some(api_key.into());
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_encoder(&mut self, encoder: Box<dyn MessageEncoder>) {
        self.encoder = encoder;
    }

    /// Drop the connection after a low-level failure and hand the error back.
    fn abort(&mut self, err: reqwest::Error) -> MailError {
        tracing::error!(error = %err, endpoint = %self.endpoint, "Postmark transport error");
        self.stop();
        MailError::Http(err)
    }
}

#[async_trait]
impl Transport for PostmarkTransport {
    fn is_started(&self) -> bool {
        self.api_key.is_some() && self.connection.is_some()
    }

    fn start(&mut self) -> Result<()> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MailError::Config("Postmark API key needs to be set".to_string()))?;

        if self.connection.is_none() {
            self.connection = Some(Connection::open(&self.endpoint, api_key)?);
            tracing::debug!(endpoint = %self.endpoint, "Postmark connection opened");
        }

        Ok(())
    }

    fn stop(&mut self) {
        if self.connection.take().is_some() {
            tracing::debug!(endpoint = %self.endpoint, "Postmark connection closed");
        }
    }

    async fn send(&mut self, message: &Message) -> Result<Delivery> {
        let event = SendEvent::new("postmark", message);
        if self.dispatcher.dispatch_before_send(&event) == Flow::Cancel {
            return Ok(Delivery::Cancelled);
        }

        let connection = self.connection.as_ref().ok_or(MailError::NotStarted)?;
        let json = self.encoder.encode(message)?;
        tracing::trace!(payload = %json, "Postmark request");
        let request = connection.post(json);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.abort(err)),
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Err(self.abort(err)),
        };

        if status.is_success() {
            tracing::trace!(response = %body, "Postmark response");
            return match serde_json::from_str::<Receipt>(&body) {
                Ok(receipt) => {
                    tracing::debug!(message_id = %receipt.message_id, "Message accepted by Postmark");
                    Ok(Delivery::Sent(receipt))
                }
                Err(err) => {
                    tracing::error!(
                        status = status.as_u16(),
                        body = %body,
                        error = %err,
                        "Unreadable Postmark receipt"
                    );
                    Err(MailError::Provider { status, body })
                }
            };
        }

        tracing::error!(status = status.as_u16(), body = %body, "Postmark rejected message");

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(error) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(MailError::Unprocessable {
                    code: error.error_code,
                    message: error.message,
                });
            }
        }

        Err(MailError::Provider { status, body })
    }

    fn register_plugin(&mut self, listener: Box<dyn SendListener>) {
        self.dispatcher.bind(listener);
    }
}
