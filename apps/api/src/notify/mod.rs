//! Chat-webhook notifier. Delivery is best-effort: failures are logged and
//! reported as an explicit outcome, never raised to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

/// Outcome of one delivery attempt. No retry: a failed send stays failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotifyOutcome {
    Delivered,
    Failed { reason: String },
}

impl NotifyOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, NotifyOutcome::Delivered)
    }
}

/// Seam over the chat webhook so the forecast pipeline can record sends in
/// tests. Carried in `AppState` as `Arc<dyn Notifier>`.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> NotifyOutcome;
}

/// POSTs `{"text": message}` to the configured webhook URL.
/// An unconfigured URL means every send fails (and is logged once per send).
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl WebhookNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            webhook_url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, message: &str) -> NotifyOutcome {
        let Some(url) = &self.webhook_url else {
            warn!("Webhook URL not configured; dropping notification");
            return NotifyOutcome::Failed {
                reason: "webhook URL not configured".to_string(),
            };
        };

        let payload = json!({ "text": message });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => NotifyOutcome::Delivered,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                error!("Failed to send webhook message (status {status}): {body}");
                NotifyOutcome::Failed {
                    reason: format!("webhook returned status {status}"),
                }
            }
            Err(e) => {
                error!("Error sending webhook message: {e}");
                NotifyOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
