use crate::errors::AppError;
use serde_json::json;
use std::time::Duration;

/// Client for the external push messaging gateway.
///
/// Delivery is best-effort throughout the system: callers log failures and
/// never let them fail the primary operation.
#[derive(Clone)]
pub struct PushClient {
    client: reqwest::Client,
    gateway_url: String,
}

impl PushClient {
    /// Creates a new `PushClient` for the given gateway endpoint.
    pub fn new(gateway_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create push client: {}", e))
            })?;

        Ok(Self {
            client,
            gateway_url,
        })
    }

    /// Dispatches one push message to the device behind `push_token`.
    pub async fn send(&self, push_token: &str, title: &str, body: &str) -> Result<(), AppError> {
        let payload = json!({
            "to": push_token,
            "title": title,
            "body": body,
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Push gateway request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Push gateway returned {}: {}",
                status, error_text
            )));
        }

        tracing::info!("Push notification dispatched");
        Ok(())
    }
}
