// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! User accounts, login and token revocation.

pub mod endpoints;
pub mod extract;
pub mod password;
pub mod types;
pub mod users;

pub use endpoints::router;
pub use extract::AuthUser;
pub use types::*;
pub use users::UserService;

use crate::common::revocation::RevocationStore;
use crate::common::store::Table;
use crate::common::token::TokenSigner;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserService>,
    pub signer: TokenSigner,
    pub revocations: Arc<dyn RevocationStore>,
}

impl AuthState {
    pub fn new(signer: TokenSigner, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            users: Arc::new(UserService::new(Arc::new(Table::new("User")))),
            signer,
            revocations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::config::BootstrapAdmin;
    use crate::common::revocation::MemoryRevocationStore;
    use crate::common::testing::send;
    use axum::http::StatusCode;
    use axum::Router;
    use serde_json::json;

    const SECRET: &str = "test-secret-with-at-least-32-bytes!!";

    async fn app() -> Router {
        let signer = TokenSigner::from_secret(Some(SECRET), 600).expect("signer");
        let state = AuthState::new(signer, Arc::new(MemoryRevocationStore::new()));
        state
            .users
            .ensure_admin(&BootstrapAdmin {
                username: "admin".to_string(),
                email: "admin@clinica.local".to_string(),
                password: "admin12345".to_string(),
            })
            .await
            .expect("admin");
        router(state)
    }

    async fn login(app: &Router, username: &str, password: &str) -> (String, u64) {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/login",
            Some(json!({ "username": username, "password": password })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["tokenType"], "Bearer");
        assert_eq!(body["data"]["expiresIn"], 600);
        let token = body["data"]["token"].as_str().expect("token").to_string();
        (token, body["data"]["user"]["id"].as_u64().expect("id"))
    }

    async fn register(app: &Router, username: &str) -> StatusCode {
        let (status, body) = send(
            app,
            "POST",
            "/api/auth/register",
            Some(json!({
                "username": username,
                "email": format!("{username}@clinica.co"),
                "fullName": "Jorge Pardo",
                "password": "clave-segura-1"
            })),
            None,
        )
        .await;
        if status == StatusCode::CREATED {
            assert!(body["data"].get("passwordHash").is_none());
            assert_eq!(body["data"]["roles"], json!(["USUARIO"]));
        }
        status
    }

    #[tokio::test]
    async fn test_register_login_me() {
        let app = app().await;
        assert_eq!(register(&app, "jorge").await, StatusCode::CREATED);
        assert_eq!(register(&app, "jorge").await, StatusCode::CONFLICT);

        let (token, id) = login(&app, "jorge", "clave-segura-1").await;
        let (status, body) = send(&app, "GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], id);

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "jorge", "password": "equivocada" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_own_token() {
        let app = app().await;
        register(&app, "jorge").await;
        let (token, _) = login(&app, "jorge", "clave-segura-1").await;

        let (status, _) = send(&app, "POST", "/api/auth/logout", None, Some(&token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", "/api/auth/me", None, Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token has been revoked");
    }

    #[tokio::test]
    async fn test_user_administration_requires_admin() {
        let app = app().await;
        register(&app, "jorge").await;
        let (user_token, user_id) = login(&app, "jorge", "clave-segura-1").await;
        let (admin_token, admin_id) = login(&app, "admin", "admin12345").await;

        let (status, _) = send(&app, "GET", "/api/usuarios", None, Some(&user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let admin_uri = format!("/api/usuarios/{admin_id}");
        let user_uri = format!("/api/usuarios/{user_id}");
        let (status, _) = send(&app, "GET", &admin_uri, None, Some(&user_token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = send(&app, "GET", &user_uri, None, Some(&user_token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "PUT",
            &format!("/api/usuarios/{user_id}"),
            Some(json!({ "roles": ["ADMIN"] })),
            Some(&user_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/usuarios/{user_id}"),
            Some(json!({ "roles": ["MEDICO"] })),
            Some(&admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["roles"], json!(["MEDICO"]));

        let (_, body) = send(&app, "GET", "/api/usuarios", None, Some(&admin_token)).await;
        assert_eq!(body["data"]["totalElements"], 2);

        let (status, _) = send(&app, "DELETE", &user_uri, None, Some(&admin_token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "jorge", "password": "clave-segura-1" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_revokes_by_jti() {
        let app = app().await;
        register(&app, "jorge").await;
        let (user_token, _) = login(&app, "jorge", "clave-segura-1").await;
        let (admin_token, _) = login(&app, "admin", "admin12345").await;

        let signer = TokenSigner::from_secret(Some(SECRET), 600).expect("signer");
        let jti = signer.verify(&user_token).expect("claims").jti;

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/auth/revoke?jti={jti}"),
            None,
            Some(&user_token),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/auth/revoke?jti={jti}&ttlSeconds={}", u64::MAX),
            None,
            Some(&admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        let (status, _) = send(&app, "GET", "/api/auth/me", None, Some(&user_token)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/auth/revoke?jti={jti}&ttlSeconds=120"),
            None,
            Some(&admin_token),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/api/auth/me", None, Some(&user_token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
