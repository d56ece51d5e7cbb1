use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::NotifyConfig;

#[derive(thiserror::Error, Debug)]
pub enum NotifyError {
    #[error("sms gateway rejected the request with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("sms gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid sms gateway api key: {0}")]
    InvalidKey(#[from] header::InvalidHeaderValue),
}

/// Outbound message dispatch.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `message` to every recipient. Returns the gateway's JSON reply.
    async fn send(
        &self,
        message: &str,
        recipients: &[String],
    ) -> Result<serde_json::Value, NotifyError>;
}

/// Used when no gateway is configured: logs and does nothing else.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(
        &self,
        message: &str,
        recipients: &[String],
    ) -> Result<serde_json::Value, NotifyError> {
        tracing::info!(
            recipients = recipients.len(),
            chars = message.chars().count(),
            "no sms gateway configured; notification dropped"
        );
        Ok(serde_json::json!({ "status": "skipped" }))
    }
}

#[derive(Serialize)]
struct SmsPayload<'a> {
    message: &'a str,
    recipients: &'a [String],
}

/// POSTs `{"message", "recipients"}` to an HTTP SMS gateway authorized by a
/// static bearer token.
pub struct SmsGatewayNotifier {
    client: Client,
    endpoint: String,
    _api_key: SecretString,
}

impl SmsGatewayNotifier {
    pub fn new(endpoint: impl Into<String>, api_key: SecretString) -> Result<Self, NotifyError> {
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            _api_key: api_key,
        })
    }
}

#[async_trait]
impl Notifier for SmsGatewayNotifier {
    async fn send(
        &self,
        message: &str,
        recipients: &[String],
    ) -> Result<serde_json::Value, NotifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SmsPayload { message, recipients })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown gateway error".to_string());
            tracing::warn!(status = status.as_u16(), "sms gateway rejected notification");
            return Err(NotifyError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(recipients = recipients.len(), "sms notification sent");
        Ok(response.json::<serde_json::Value>().await?)
    }
}

/// Gateway notifier when `[notify]` is configured, otherwise the no-op.
pub fn from_config(cfg: Option<&NotifyConfig>) -> Result<Arc<dyn Notifier>, NotifyError> {
    match cfg {
        Some(cfg) => Ok(Arc::new(SmsGatewayNotifier::new(
            cfg.endpoint.clone(),
            SecretString::from(cfg.api_key.clone()),
        )?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}
