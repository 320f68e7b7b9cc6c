use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use http::header::AUTHORIZATION;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::TokenResponse;

const OAUTH_SCOPE: &str = "https://api.ebay.com/oauth/api_scope";
const DEFAULT_LIFETIME_SECS: i64 = 7200;
const EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Clone)]
pub struct Credential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// A credential stops being served once `now` enters the safety
    /// margin before expiry, even though it is still technically valid.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS)
    }
}

/// Expiry-aware cache for the OAuth client-credentials token.
///
/// One cache per connector instance; no global state. `get_token` never
/// returns an error: an unconfigured cache or a failed exchange both
/// surface as `None`, which callers treat as a normal degraded outcome.
pub struct TokenCache {
    auth_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    cached: Mutex<Option<Credential>>,
}

impl TokenCache {
    pub fn new(auth_url: String, client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self {
            auth_url,
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    pub async fn get_token(&self, client: &reqwest::Client) -> Option<String> {
        {
            let cached = self.cached.lock().await;
            if let Some(credential) = cached.as_ref() {
                if credential.is_fresh(Utc::now()) {
                    return Some(credential.token.clone());
                }
            }
        }

        let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) else {
            info!("API credentials not configured");
            return None;
        };

        match self.fetch_token(client, id, secret).await {
            Ok(credential) => {
                debug!(expires_at = %credential.expires_at, "Fetched new access token");
                let token = credential.token.clone();
                *self.cached.lock().await = Some(credential);
                Some(token)
            }
            Err(e) => {
                warn!(error = %e, "OAuth token request failed");
                None
            }
        }
    }

    async fn fetch_token(
        &self,
        client: &reqwest::Client,
        id: &str,
        secret: &str,
    ) -> Result<Credential> {
        let encoded = BASE64.encode(format!("{}:{}", id, secret));
        let params = [
            ("grant_type", "client_credentials"),
            ("scope", OAUTH_SCOPE),
        ];

        let response = client
            .post(&self.auth_url)
            .header(AUTHORIZATION, format!("Basic {}", encoded))
            .form(&params)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(Error::Status(response.status()));
        }

        let body = response.bytes().await?;
        let token: TokenResponse = serde_json::from_slice(&body)?;

        let lifetime = token.expires_in.unwrap_or(DEFAULT_LIFETIME_SECS);
        Ok(Credential {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        })
    }
}
