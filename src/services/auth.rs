//! Bearer token verification
//!
//! Tokens are never issued by this server in production: Firebase signs ID
//! tokens with rotating RSA keys published as a JWK set, and we only check
//! them. The shared-secret verifier covers local runs and tests.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, decode_header, encode, jwk::JwkSet, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    config::{AuthConfig, AuthProvider},
    error::{AppError, AppResult},
    models::Identity,
};

/// Turns a bearer credential into a verified identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<Identity>;
}

/// Claims we read from an ID token
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl TokenClaims {
    fn into_identity(self) -> AppResult<Identity> {
        match self.email {
            Some(email) if !email.is_empty() => Ok(Identity::new(email)),
            _ => Err(AppError::Authentication("Token carries no email".to_string())),
        }
    }
}

fn unauthorized(e: jsonwebtoken::errors::Error) -> AppError {
    AppError::Authentication(format!("Unauthorized User: {}", e))
}

/// Shortest shared secret accepted from configuration
pub const MIN_SECRET_LEN: usize = 32;

/// Sample value from the docs, known to everyone
const PLACEHOLDER_SECRET: &str = "change-this-secret-in-production";

/// Build the verifier selected by configuration
pub fn verifier_from_config(config: &AuthConfig) -> AppResult<Arc<dyn IdentityVerifier>> {
    match config.provider {
        AuthProvider::Firebase => {
            let project_id = config.firebase_project_id.clone().ok_or_else(|| {
                AppError::Internal("auth.firebase_project_id is required for the firebase provider".to_string())
            })?;
            Ok(Arc::new(FirebaseVerifier::new(
                project_id,
                config.jwks_url.clone(),
                Duration::from_secs(config.jwks_cache_seconds),
            )))
        }
        AuthProvider::SharedSecret => {
            let secret = config.jwt_secret.clone().ok_or_else(|| {
                AppError::Internal("auth.jwt_secret is required for the shared_secret provider".to_string())
            })?;
            if secret == PLACEHOLDER_SECRET || secret.len() < MIN_SECRET_LEN {
                return Err(AppError::Internal(format!(
                    "auth.jwt_secret must be a private value of at least {} bytes",
                    MIN_SECRET_LEN
                )));
            }
            Ok(Arc::new(SharedSecretVerifier::new(secret)))
        }
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Firebase ID tokens against Google's published signing keys
pub struct FirebaseVerifier {
    project_id: String,
    jwks_url: String,
    cache_ttl: Duration,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseVerifier {
    pub fn new(project_id: String, jwks_url: String, cache_ttl: Duration) -> Self {
        Self {
            project_id,
            jwks_url,
            cache_ttl,
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation
    }

    async fn fetch_keys(&self) -> AppResult<JwkSet> {
        tracing::debug!("Fetching token signing keys from {}", self.jwks_url);
        let keys = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AppError::Internal(format!("Failed to fetch signing keys: {}", e)))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid signing key set: {}", e)))?;

        *self.cache.write().await = Some(CachedKeys {
            keys: keys.clone(),
            fetched_at: Instant::now(),
        });
        Ok(keys)
    }

    async fn keys(&self) -> AppResult<JwkSet> {
        if let Some(ref cached) = *self.cache.read().await {
            if cached.fetched_at.elapsed() < self.cache_ttl {
                return Ok(cached.keys.clone());
            }
        }
        self.fetch_keys().await
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let header = decode_header(token).map_err(unauthorized)?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Authentication("Token has no key id".to_string()))?;

        let mut keys = self.keys().await?;
        if keys.find(&kid).is_none() {
            // Keys rotate; an unknown kid may just mean our copy is stale
            keys = self.fetch_keys().await?;
        }
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AppError::Authentication("Token signed with unknown key".to_string()))?;
        let key = DecodingKey::from_jwk(jwk).map_err(unauthorized)?;

        let data = decode::<TokenClaims>(token, &key, &self.validation()).map_err(unauthorized)?;
        data.claims.into_identity()
    }
}

/// Verifies HS256 tokens signed with a shared secret
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Sign a token for `email`, valid for `ttl`
    pub fn issue(&self, email: &str, ttl: chrono::Duration) -> AppResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: email.to_string(),
            email: Some(email.to_string()),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}

#[async_trait]
impl IdentityVerifier for SharedSecretVerifier {
    async fn verify(&self, token: &str) -> AppResult<Identity> {
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(unauthorized)?;
        data.claims.into_identity()
    }
}
