// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Signed bearer tokens (compact JWT, HS256).
//!
//! The signing key is derived once at startup, either from the configured
//! secret or from random bytes when no secret is configured. Every token
//! carries a `jti` that the revocation list is keyed on.

use crate::common::revocation::{RevocationStore, MAX_REVOCATION_TTL};
use crate::{PlatformError, PlatformResult};
use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const MIN_SECRET_LEN: usize = 32;
const RANDOM_KEY_LEN: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username.
    pub sub: String,
    /// User id.
    pub uid: u64,
    pub roles: Vec<String>,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Seconds until expiry, zero once expired.
    pub fn remaining_seconds(&self, now: i64) -> u64 {
        u64::try_from(self.exp - now).unwrap_or(0)
    }
}

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

#[derive(Clone)]
pub struct TokenSigner {
    key: Arc<Vec<u8>>,
    lifetime_seconds: u64,
}

impl TokenSigner {
    /// Derive the signing key from `secret`, or generate a random one.
    pub fn from_secret(secret: Option<&str>, lifetime_seconds: u64) -> PlatformResult<Self> {
        if lifetime_seconds == 0 {
            return Err(PlatformError::Validation(
                "token lifetime must be positive".to_string(),
            ));
        }
        if lifetime_seconds > MAX_REVOCATION_TTL.as_secs() {
            return Err(PlatformError::Validation(format!(
                "token lifetime must be at most {} seconds",
                MAX_REVOCATION_TTL.as_secs()
            )));
        }
        let key = match secret {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => secret.as_bytes().to_vec(),
            Some(_) => {
                return Err(PlatformError::Validation(format!(
                    "token secret must be at least {MIN_SECRET_LEN} bytes"
                )))
            }
            None => {
                warn!(
                    "No token secret configured, using a random key; \
                     tokens will not survive a restart"
                );
                let mut key = vec![0u8; RANDOM_KEY_LEN];
                rand::thread_rng().fill_bytes(&mut key);
                key
            }
        };
        Ok(Self {
            key: Arc::new(key),
            lifetime_seconds,
        })
    }

    pub fn lifetime_seconds(&self) -> u64 {
        self.lifetime_seconds
    }

    /// Issue a fresh token for `username`.
    pub fn issue(
        &self,
        username: &str,
        uid: u64,
        roles: Vec<String>,
    ) -> PlatformResult<(String, Claims)> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            uid,
            roles,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.lifetime_seconds as i64,
        };
        let token = self.sign(&claims)?;
        Ok((token, claims))
    }

    pub fn sign(&self, claims: &Claims) -> PlatformResult<String> {
        let header = JwtHeader {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| PlatformError::Internal(format!("Failed to serialize header: {e}")))?;
        let claims_json = serde_json::to_vec(claims)
            .map_err(|e| PlatformError::Internal(format!("Failed to serialize claims: {e}")))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.mac(&message)?.finalize().into_bytes();
        Ok(format!("{}.{}", message, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Check signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> PlatformResult<Claims> {
        let invalid =
            |reason: &str| PlatformError::Unauthorized(format!("Invalid token: {reason}"));

        let mut parts = token.split('.');
        let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("malformed"));
        };

        let header: JwtHeader = URL_SAFE_NO_PAD
            .decode(header_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or_else(|| invalid("bad header"))?;
        if header.alg != "HS256" {
            return Err(invalid("unsupported algorithm"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| invalid("bad signature encoding"))?;
        self.mac(&format!("{header_b64}.{claims_b64}"))?
            .verify_slice(&signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(claims_b64)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or_else(|| invalid("bad claims"))?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(PlatformError::Unauthorized("Token has expired".to_string()));
        }
        Ok(claims)
    }

    fn mac(&self, message: &str) -> PlatformResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| PlatformError::Internal(format!("Failed to create HMAC: {e}")))?;
        mac.update(message.as_bytes());
        Ok(mac)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the bearer token in `headers` and make sure its `jti` has not been
/// revoked.
pub async fn authenticate(
    headers: &HeaderMap,
    signer: &TokenSigner,
    revocations: &dyn RevocationStore,
) -> PlatformResult<Claims> {
    let token = bearer_token(headers)
        .ok_or_else(|| PlatformError::Unauthorized("Missing bearer token".to_string()))?;
    let claims = signer.verify(token)?;
    if revocations.is_revoked(&claims.jti).await? {
        return Err(PlatformError::Unauthorized("Token has been revoked".to_string()));
    }
    Ok(claims)
}
