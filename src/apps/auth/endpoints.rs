// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::common::{created, health_routes, ok, ok_with_message, ApiResponse, Page, PageQuery};
use crate::common::{ValidJson, ValidPath, ValidQuery};
use crate::PlatformResult;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use std::time::Duration;
use tracing::info;

type Reply<T> = PlatformResult<Json<ApiResponse<T>>>;

pub async fn register(
    State(state): State<AuthState>,
    ValidJson(request): ValidJson<RegisterRequest>,
) -> PlatformResult<(StatusCode, Json<ApiResponse<User>>)> {
    let user = state.users.register(request).await?;
    Ok(created(user, "User registered"))
}

pub async fn login(
    State(state): State<AuthState>,
    ValidJson(request): ValidJson<LoginRequest>,
) -> Reply<LoginResponse> {
    let user = state
        .users
        .authenticate(&request.username, &request.password)
        .await?;
    let (token, claims) = state
        .signer
        .issue(&user.username, user.id, user.role_names())?;
    info!("Issued token {} to {}", claims.jti, user.username);
    Ok(ok(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.signer.lifetime_seconds(),
        user,
    }))
}

/// Revoke any token by `jti`.
pub async fn revoke(
    State(state): State<AuthState>,
    caller: AuthUser,
    ValidQuery(query): ValidQuery<RevokeQuery>,
) -> PlatformResult<StatusCode> {
    caller.require_admin()?;
    let ttl = query.ttl_seconds.unwrap_or(state.signer.lifetime_seconds());
    state
        .revocations
        .revoke(&query.jti, Duration::from_secs(ttl))
        .await?;
    info!("{} revoked token {} for {}s", caller.0.sub, query.jti, ttl);
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke the caller's own token for what is left of its lifetime.
pub async fn logout(
    State(state): State<AuthState>,
    caller: AuthUser,
) -> PlatformResult<StatusCode> {
    let remaining = caller.0.remaining_seconds(Utc::now().timestamp()).max(1);
    state
        .revocations
        .revoke(&caller.0.jti, Duration::from_secs(remaining))
        .await?;
    info!("{} logged out", caller.0.sub);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(State(state): State<AuthState>, caller: AuthUser) -> Reply<User> {
    Ok(ok(state.users.get(caller.0.uid).await?))
}

pub async fn list_users(
    State(state): State<AuthState>,
    caller: AuthUser,
    ValidQuery(query): ValidQuery<PageQuery>,
) -> Reply<Page<User>> {
    caller.require_admin()?;
    Ok(ok(state.users.list(query).await?))
}

pub async fn get_user(
    State(state): State<AuthState>,
    caller: AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> Reply<User> {
    caller.require_self_or_admin(id)?;
    Ok(ok(state.users.get(id).await?))
}

pub async fn update_user(
    State(state): State<AuthState>,
    caller: AuthUser,
    ValidPath(id): ValidPath<u64>,
    ValidJson(update): ValidJson<UserUpdate>,
) -> Reply<User> {
    caller.require_self_or_admin(id)?;
    let user = state.users.update(id, update, caller.is_admin()).await?;
    Ok(ok_with_message(user, "User updated"))
}

pub async fn deactivate_user(
    State(state): State<AuthState>,
    caller: AuthUser,
    ValidPath(id): ValidPath<u64>,
) -> PlatformResult<StatusCode> {
    caller.require_admin()?;
    state.users.deactivate(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/revoke", post(revoke))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/usuarios", get(list_users))
        .route(
            "/api/usuarios/:id",
            get(get_user).put(update_user).delete(deactivate_user),
        )
        .with_state(state)
        .merge(health_routes("auth"))
}
