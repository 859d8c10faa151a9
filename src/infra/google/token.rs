use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Where the Sheets access token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleCredentials {
    /// A ready access token (`GOOGLE_ACCESS_TOKEN`).
    AccessToken(String),
    /// An OAuth client plus refresh token, exchanged on startup.
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleCredentials {
    /// Reads credentials from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through `lookup`; a direct access token wins.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("GOOGLE_ACCESS_TOKEN") {
            return Ok(GoogleCredentials::AccessToken(token));
        }
        match (
            get("GOOGLE_CLIENT_ID"),
            get("GOOGLE_CLIENT_SECRET"),
            get("GOOGLE_REFRESH_TOKEN"),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(GoogleCredentials::Refresh {
                    client_id,
                    client_secret,
                    refresh_token,
                })
            }
            _ => bail!(
                "Set GOOGLE_ACCESS_TOKEN, or GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN \
                 (for a service account, pass a token minted with \
                 `gcloud auth print-access-token --impersonate-service-account=<email>` as GOOGLE_ACCESS_TOKEN)"
            ),
        }
    }

    /// Returns an access token, exchanging the refresh token if needed.
    pub async fn access_token(&self) -> Result<String> {
        match self {
            GoogleCredentials::AccessToken(token) => Ok(token.clone()),
            GoogleCredentials::Refresh {
                client_id,
                client_secret,
                refresh_token,
            } => exchange_token(client_id, client_secret, refresh_token).await,
        }
    }
}

async fn exchange_token(client_id: &str, client_secret: &str, refresh_token: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let token_request = TokenRequest {
        client_id,
        client_secret,
        refresh_token,
        grant_type: "refresh_token",
    };

    let response = client
        .post(TOKEN_URL)
        .form(&token_request)
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to send token request: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow::anyhow!("Token exchange failed with status {}: {}", status, body));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse token response: {}", e))?;

    Ok(token_response.access_token)
}
