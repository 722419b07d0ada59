// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity Token Provider
//!
//! Exchanges an API key for a bearer token at the regional identity endpoint.
//!
//! ```text
//! POST https://iam.<region>.<domain>/oidc/token
//! Authorization: Basic base64("bx:bx")
//! Content-Type: application/x-www-form-urlencoded
//!
//! apikey=<key>&grant_type=urn:ibm:params:oauth:grant-type:apikey&...
//! ```
//!
//! # Token lifetime
//!
//! Tokens are short-lived but their expiry is not tracked. [`IamTokenProvider::token`]
//! only fetches when nothing is cached; a run that outlives its token will see
//! broker calls fail with the broker's authorization error.

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::{Credentials, ProvisionerSettings};
use crate::errors::{ProvisionError, ProvisionResult};

/// Client identity the broker expects on token requests
const CLIENT_ID: &str = "bx";
const CLIENT_SECRET: &str = "bx";

/// Opaque API key; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> ProvisionResult<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(ProvisionError::Configuration("apikey is empty".to_string()));
        }
        Ok(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Access token plus the refresh token issued with it
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken {
    access_token: String,
    refresh_token: Option<String>,
}

impl BearerToken {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Value for the `Authorization` header of broker calls
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("access_token", &"***")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    uaa_token: String,
    #[serde(default)]
    uaa_refresh_token: Option<String>,
}

/// Form body of the API-key grant
pub(crate) fn grant_body(api_key: &ApiKey) -> String {
    format!(
        "apikey={}&grant_type=urn:ibm:params:oauth:grant-type:apikey\
         &response_type=cloud_iam,uaa&uaa_client_id=cf&uaa_client_secret=",
        urlencoding::encode(api_key.expose())
    )
}

/// Token provider backed by the regional identity endpoint
pub struct IamTokenProvider {
    client: Client,
    token_url: String,
    api_key: ApiKey,
    token: Option<BearerToken>,
}

impl IamTokenProvider {
    /// Create a provider for the credentials' region
    pub fn new(credentials: &Credentials, settings: &ProvisionerSettings) -> ProvisionResult<Self> {
        let client = Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self::with_client(
            client,
            settings.token_url(credentials.region),
            credentials.api_key.clone(),
        ))
    }

    /// Create a provider against an explicit token URL
    pub fn with_client(client: Client, token_url: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            api_key,
            token: None,
        }
    }

    /// Cached token, fetched on first use
    pub async fn token(&mut self) -> ProvisionResult<BearerToken> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        self.fetch_token().await
    }

    /// Request a new token, replacing any cached one
    pub async fn fetch_token(&mut self) -> ProvisionResult<BearerToken> {
        info!("Requesting token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(CLIENT_ID, Some(CLIENT_SECRET))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(header::ACCEPT, "application/json")
            .body(grant_body(&self.api_key))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Token endpoint returned {}", status);
            return Err(ProvisionError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = response.json().await?;
        let token = BearerToken::new(parsed.uaa_token, parsed.uaa_refresh_token);
        debug!("Token acquired");

        self.token = Some(token.clone());
        Ok(token)
    }

    /// Whether a token is currently cached
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}
