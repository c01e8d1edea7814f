use crate::errors::AppError;
use serde::Deserialize;
use std::time::Duration;

/// Client for the external identity provider.
///
/// The provider owns credential issuance and verification; this service only
/// ever asks it to resolve a bearer token to a stable subject id.
#[derive(Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
}

/// Shape of the provider's verification response.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    /// Stable subject id for the token's owner.
    sub: String,
}

impl AuthClient {
    /// Creates a new `AuthClient` against the given provider base URL.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create auth client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    /// Resolves an opaque bearer token to the provider's subject id.
    ///
    /// A 401/403 from the provider means the token is invalid or expired and
    /// maps to `Unauthenticated`; any other failure is an upstream problem.
    pub async fn verify_token(&self, token: &str) -> Result<String, AppError> {
        let url = format!("{}/verify", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalApiError(format!("Identity provider request failed: {}", e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AppError::Unauthenticated(
                "token rejected by identity provider".to_string(),
            ));
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Identity provider returned {}: {}",
                status, error_text
            )));
        }

        let verified: VerifyResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse verification response: {}", e))
        })?;

        if verified.sub.trim().is_empty() {
            return Err(AppError::Unauthenticated(
                "identity provider returned empty subject".to_string(),
            ));
        }

        tracing::debug!("Token verified for subject {}", verified.sub);
        Ok(verified.sub)
    }
}
