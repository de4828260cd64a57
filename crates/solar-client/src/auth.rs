//! Service-account authentication for the Solar API.
//!
//! The flow is the OAuth2 JWT bearer grant: a short-lived assertion signed
//! with the service account's RSA key is exchanged at the key's `token_uri`
//! for an access token. Tokens are fetched per request and never cached.

use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use reqwest::Client;
use ring::rand::SystemRandom;
use ring::signature::{RsaKeyPair, RSA_PKCS1_SHA256};
use roof_common::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::request_error;
use crate::TokenProvider;

pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/solar";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Assertion lifetime in seconds (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const SERVICE: &str = "OAuth token endpoint";

/// An OAuth2 bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Split a comma-separated scope list, dropping blanks.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The fields of a service-account JSON key file that the grant needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub private_key_id: Option<String>,
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> ServiceResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ServiceError::Authentication(format!("invalid service account file: {}", e))
        })
    }

    pub async fn from_file(path: &Path) -> ServiceResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServiceError::Authentication(format!(
                "cannot read service account file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&contents)
    }

    /// Build and sign the RS256 assertion for `scopes`, issued at `issued_at`
    /// (seconds since the epoch).
    pub fn signed_assertion(&self, scopes: &[String], issued_at: i64) -> ServiceResult<String> {
        let header = JwtHeader {
            alg: "RS256",
            typ: "JWT",
            kid: self.private_key_id.as_deref(),
        };
        let claims = JwtClaims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let signing_input = format!("{}.{}", encode_segment(&header)?, encode_segment(&claims)?);
        let signature = sign_rs256(&self.private_key, signing_input.as_bytes())?;

        Ok(format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature)))
    }
}

#[derive(Serialize)]
struct JwtHeader<'a> {
    alg: &'a str,
    typ: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kid: Option<&'a str>,
}

#[derive(Serialize)]
struct JwtClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

fn encode_segment<T: Serialize>(value: &T) -> ServiceResult<String> {
    let json = serde_json::to_vec(value)
        .map_err(|e| ServiceError::Authentication(format!("failed to encode JWT segment: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Strip PEM armour and decode the base64 body to DER.
pub(crate) fn pem_to_der(pem: &str) -> ServiceResult<Vec<u8>> {
    let body: String = pem
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();

    if body.is_empty() {
        return Err(ServiceError::Authentication(
            "private key is not PEM encoded".to_string(),
        ));
    }

    STANDARD
        .decode(body.as_bytes())
        .map_err(|e| ServiceError::Authentication(format!("invalid private key encoding: {}", e)))
}

fn sign_rs256(private_key_pem: &str, message: &[u8]) -> ServiceResult<Vec<u8>> {
    let der = pem_to_der(private_key_pem)?;
    let key_pair = RsaKeyPair::from_pkcs8(&der)
        .map_err(|e| ServiceError::Authentication(format!("invalid private key: {}", e)))?;

    let mut signature = vec![0u8; key_pair.public().modulus_len()];
    key_pair
        .sign(&RSA_PKCS1_SHA256, &SystemRandom::new(), message, &mut signature)
        .map_err(|_| ServiceError::Authentication("failed to sign assertion".to_string()))?;

    Ok(signature)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchanges a service-account key for access tokens.
#[derive(Clone)]
pub struct ServiceAccountTokenProvider {
    client: Client,
    credentials_path: PathBuf,
    scopes: Vec<String>,
}

impl ServiceAccountTokenProvider {
    /// The key file is read on every call, so rotating it needs no restart.
    pub fn new(client: Client, credentials_path: impl Into<PathBuf>, scopes: Vec<String>) -> Self {
        let scopes = if scopes.is_empty() {
            vec![DEFAULT_SCOPE.to_string()]
        } else {
            scopes
        };
        Self {
            client,
            credentials_path: credentials_path.into(),
            scopes,
        }
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    async fn exchange(&self, key: &ServiceAccountKey) -> ServiceResult<AccessToken> {
        let assertion = key.signed_assertion(&self.scopes, chrono::Utc::now().timestamp())?;

        let response = self
            .client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| request_error(SERVICE, e))?;

        let status = response.status();
        let body: TokenResponse = response.json().await.map_err(|e| {
            ServiceError::Authentication(format!(
                "unreadable token response (HTTP {}): {}",
                status.as_u16(),
                e
            ))
        })?;

        match body.access_token {
            Some(token) if status.is_success() && !token.is_empty() => Ok(AccessToken(token)),
            _ => Err(ServiceError::Authentication(format!(
                "token exchange failed (HTTP {}): {} {}",
                status.as_u16(),
                body.error.unwrap_or_else(|| "no access_token".to_string()),
                body.error_description.unwrap_or_default()
            )
            .trim_end()
            .to_string())),
        }
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountTokenProvider {
    #[instrument(skip(self))]
    async fn get_access_token(&self) -> ServiceResult<AccessToken> {
        let key = ServiceAccountKey::from_file(&self.credentials_path).await?;
        debug!(
            client_email = %key.client_email,
            path = %self.credentials_path.display(),
            "Requesting access token"
        );

        // A token endpoint that is down is still an auth failure for callers.
        self.exchange(&key).await.map_err(|e| match e {
            ServiceError::Authentication(_) => e,
            other => ServiceError::Authentication(other.to_string()),
        })
    }
}
