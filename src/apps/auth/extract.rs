// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::types::Role;
use super::AuthState;
use crate::common::token::{authenticate, Claims};
use crate::{PlatformError, PlatformResult};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// Caller identified by a valid, unrevoked bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.0.has_role(Role::Admin.as_str())
    }

    pub fn require_admin(&self) -> PlatformResult<()> {
        if !self.is_admin() {
            return Err(PlatformError::Forbidden("ADMIN role required".to_string()));
        }
        Ok(())
    }

    pub fn require_self_or_admin(&self, user_id: u64) -> PlatformResult<()> {
        if self.0.uid != user_id && !self.is_admin() {
            return Err(PlatformError::Forbidden(
                "not allowed to access another user".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FromRequestParts<AuthState> for AuthUser {
    type Rejection = PlatformError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState,
    ) -> Result<Self, Self::Rejection> {
        let claims = authenticate(&parts.headers, &state.signer, state.revocations.as_ref()).await?;
        Ok(AuthUser(claims))
    }
}
