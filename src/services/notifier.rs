use reqwest::Client;
use serde::Serialize;
use uuid::Uuid;

use super::ReaderError;

/// Where an unexpected failure happened, attached to the report.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub incident_id: Uuid,
    pub data: String,
}

impl ErrorContext {
    pub fn for_route(url: &str, body: serde_json::Value) -> Self {
        let data = serde_json::json!({ "url": url, "body": body });

        ErrorContext {
            incident_id: Uuid::new_v4(),
            data: serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string()),
        }
    }
}

/// Best-effort sink for unexpected errors. Implementations must return
/// immediately and swallow their own failures.
pub trait ErrorReporter: Send + Sync {
    fn report_error(&self, error: &ReaderError, context: ErrorContext);
}

pub struct LogNotifier;

impl ErrorReporter for LogNotifier {
    fn report_error(&self, error: &ReaderError, context: ErrorContext) {
        log::error!(
            "Unexpected error [{}]: {} | Data: {}",
            context.incident_id,
            error,
            context.data
        );
    }
}

#[derive(Serialize)]
struct WebhookPayload {
    incident_id: String,
    message: String,
    data: String,
}

pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(client: Client, url: String) -> Self {
        WebhookNotifier { client, url }
    }
}

impl ErrorReporter for WebhookNotifier {
    fn report_error(&self, error: &ReaderError, context: ErrorContext) {
        LogNotifier.report_error(error, context.clone());

        let payload = WebhookPayload {
            incident_id: context.incident_id.to_string(),
            message: error.to_string(),
            data: context.data,
        };
        let request = self.client.post(&self.url).json(&payload);

        tokio::spawn(async move {
            match request.send().await {
                Ok(res) if !res.status().is_success() => {
                    log::error!("Error notifier webhook answered with {}", res.status())
                }
                Ok(_) => {}
                Err(e) => log::error!("Failed to deliver error notification: {:?}", e),
            }
        });
    }
}
