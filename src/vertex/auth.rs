//! Service account authentication for Vertex AI.
//!
//! A signed JWT assertion is exchanged at the key's `token_uri` for a short
//! lived bearer token, which is cached until shortly before it expires.

use crate::error::{Result, StudioError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_LIFETIME_SECONDS: i64 = 3600;
const TOKEN_EXPIRY_BUFFER_SECONDS: i64 = 60;

#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Returns a bearer token valid for at least the next request.
    async fn access_token(&self) -> Result<SecretString>;
}

/// Fields of a Google service account JSON key that the relay needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: SecretString,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| StudioError::Config(format!("Invalid service account key: {}", e)))
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StudioError::Config(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&raw)
    }

    fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| StudioError::Auth(format!("Invalid private key: {}", e)))
    }
}

#[derive(Clone)]
struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn needs_refresh(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(TOKEN_EXPIRY_BUFFER_SECONDS)
    }
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
    http_client: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Fails if the private key is not a usable RSA PEM key.
    pub fn new(key: ServiceAccountKey, http_client: Client) -> Result<Self> {
        let encoding_key = key.encoding_key()?;
        Ok(Self {
            key,
            encoding_key,
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
            http_client,
            cached: RwLock::new(None),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    fn create_assertion(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: String,
            aud: &'a str,
            exp: i64,
            iat: i64,
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            exp: now + JWT_LIFETIME_SECONDS,
            iat: now,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| StudioError::Auth(format!("JWT encoding failed: {}", e)))
    }

    async fn exchange_assertion(&self) -> Result<CachedToken> {
        #[derive(Serialize)]
        struct TokenRequest<'a> {
            grant_type: &'a str,
            assertion: &'a str,
        }

        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            expires_in: i64,
        }

        let assertion = self.create_assertion()?;
        let response = self
            .http_client
            .post(&self.key.token_uri)
            .form(&TokenRequest {
                grant_type: "urn:ietf:params:oauth:grant-type:jwt-bearer",
                assertion: &assertion,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StudioError::Auth(format!(
                "Token exchange failed with status {}: {}",
                status, text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| StudioError::Auth(format!("Failed to parse token response: {}", e)))?;

        log::debug!(
            "Obtained access token for {}, valid for {}s",
            self.key.client_email,
            token.expires_in
        );

        Ok(CachedToken {
            token: SecretString::new(token.access_token),
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<SecretString> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if !cached.needs_refresh() {
                return Ok(cached.token.clone());
            }
        }

        let mut slot = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(cached) = slot.as_ref() {
            if !cached.needs_refresh() {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.exchange_assertion().await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);
        Ok(token)
    }
}
