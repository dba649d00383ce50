//! Outbound alerts for unexpected failures
//!
//! [`AlertSink`] is the only contract: `send(title, body)`. The HTTP layer
//! fires alerts from a spawned task so a slow sink never delays a response.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shared::error::AppError;

use crate::utils::Unexpected;

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError>;
}

/// Posts `{"title": ..., "body": ...}` to a webhook
pub struct WebhookAlertSink {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
}

impl WebhookAlertSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        self.client
            .post(&self.url)
            .json(&WebhookPayload { title, body })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                tracing::warn!(error = %e, url = %self.url, "Alert webhook failed");
                AppError::network_error()
            })?;
        Ok(())
    }
}

/// Used when no webhook is configured: the alert only reaches the log
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
        tracing::error!(target: "alert", %title, %body, "Alert raised");
        Ok(())
    }
}

pub fn sink_from_config(webhook_url: Option<&str>) -> Arc<dyn AlertSink> {
    match webhook_url {
        Some(url) => Arc::new(WebhookAlertSink::new(url)),
        None => Arc::new(LogAlertSink),
    }
}

/// Alert attached to a failed response, picked up by the alert middleware
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReport {
    pub title: String,
    pub body: String,
}

impl AlertReport {
    pub fn for_unexpected(u: &Unexpected) -> Self {
        Self {
            title: format!("[new error] type {} | please handle soon", u.type_name),
            body: format!("summary:\n{}\n\nstack:\n{}", u.error, u.backtrace),
        }
    }

    pub fn for_panic(message: &str) -> Self {
        Self {
            title: "[new error] type panic | please handle soon".to_string(),
            body: format!("summary:\n{message}"),
        }
    }
}

/// Deliver `report` in the background; failures are logged, never surfaced
pub fn spawn_report(sink: Arc<dyn AlertSink>, report: AlertReport) {
    tokio::spawn(async move {
        if let Err(e) = sink.send(&report.title, &report.body).await {
            tracing::warn!(code = %e.code, title = %report.title, "Alert could not be delivered");
        }
    });
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Keeps every alert in memory
    #[derive(Default)]
    pub struct RecordingSink {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send(&self, title: &str, body: &str) -> Result<(), AppError> {
            self.sent.lock().await.push((title.to_string(), body.to_string()));
            Ok(())
        }
    }
}
