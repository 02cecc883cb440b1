//! OAuth2 refresh-token grant.
//!
//! Accounts are provisioned out of band with a long-lived refresh token;
//! at runtime only short-lived access tokens are minted from it.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::IntegrationError;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>, // Unix timestamp
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub service_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
}

/// Exchange a refresh token for a fresh access token.
pub async fn refresh_token(
    client: &Client,
    config: &OAuthConfig,
    refresh: &str,
) -> Result<OAuthTokens, IntegrationError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh),
        ("grant_type", "refresh_token"),
    ];

    tracing::debug!(service = %config.service_name, "refreshing access token");
    let resp = client.post(&config.token_url).form(&params).send().await?;
    let status = resp.status();
    let body: serde_json::Value = resp.json().await?;

    if let Some(error) = body.get("error") {
        let error = error.as_str().unwrap_or("oauth error");
        let detail = body["error_description"].as_str().unwrap_or_default();
        return Err(IntegrationError::Auth {
            service: config.service_name.clone(),
            message: format!("{error} {detail}").trim().to_string(),
        });
    }
    if !status.is_success() {
        return Err(IntegrationError::Auth {
            service: config.service_name.clone(),
            message: format!("token endpoint returned HTTP {status}"),
        });
    }

    let access_token = body["access_token"]
        .as_str()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| IntegrationError::InvalidResponse("missing access_token".to_string()))?
        .to_string();

    let expires_in = body.get("expires_in").and_then(|v| v.as_i64());
    let expires_at = expires_in.map(|ei| chrono::Utc::now().timestamp() + ei);

    Ok(OAuthTokens {
        access_token,
        refresh_token: body
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .map(String::from)
            .or_else(|| Some(refresh.to_string())),
        expires_at,
        token_type: body["token_type"]
            .as_str()
            .unwrap_or("Bearer")
            .to_string(),
        scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
    })
}

/// Check if tokens are expired (with 60s buffer).
pub fn is_expired(tokens: &OAuthTokens) -> bool {
    match tokens.expires_at {
        Some(exp) => chrono::Utc::now().timestamp() > exp - 60,
        None => false,
    }
}
