// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single entry point in front of the other services. Authenticates bearer
//! tokens and relays requests to the upstream owning the path.

pub mod filter;
pub mod proxy;

pub use proxy::{Route, RouteTable};

use crate::common::config::GatewayConfig;
use crate::common::health_routes;
use crate::common::revocation::RevocationStore;
use crate::common::token::TokenSigner;
use crate::{PlatformError, PlatformResult};
use axum::{middleware, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct GatewayState {
    pub signer: TokenSigner,
    pub revocations: Arc<dyn RevocationStore>,
    pub routes: Arc<RouteTable>,
    pub public_paths: Arc<Vec<String>>,
    pub client: reqwest::Client,
}

impl GatewayState {
    pub fn new(
        config: &GatewayConfig,
        signer: TokenSigner,
        revocations: Arc<dyn RevocationStore>,
    ) -> PlatformResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_seconds))
            .build()
            .map_err(|e| PlatformError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            signer,
            revocations,
            routes: Arc::new(RouteTable::new(&config.routes)?),
            public_paths: Arc::new(
                config
                    .public_paths
                    .iter()
                    .map(|p| p.trim_end_matches('/').to_string())
                    .collect(),
            ),
            client,
        })
    }

    pub fn is_public(&self, path: &str) -> bool {
        let path = path.trim_end_matches('/');
        self.public_paths.iter().any(|p| p == path)
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .fallback(proxy::forward)
        .with_state(state.clone())
        .merge(health_routes("gateway"))
        .layer(middleware::from_fn_with_state(
            state,
            filter::authenticate_request,
        ))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::config::RouteConfig;
    use crate::common::revocation::MemoryRevocationStore;
    use crate::common::testing::send;
    use axum::http::{header, HeaderMap, StatusCode, Uri};
    use axum::routing::get;
    use axum::Json;
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    const SECRET: &str = "gateway-test-secret-0123456789abcdef";

    async fn echo(uri: Uri, headers: HeaderMap) -> Json<Value> {
        Json(json!({
            "success": true,
            "data": {
                "uri": uri.to_string(),
                "authorized": headers.contains_key(header::AUTHORIZATION)
            }
        }))
    }

    /// Upstream on an ephemeral port that echoes what it received.
    async fn spawn_upstream() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let app = Router::new().route("/api/pacientes", get(echo));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}")
    }

    /// An address nothing listens on.
    async fn dead_upstream() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        format!("http://{addr}")
    }

    async fn gateway() -> (Router, GatewayState) {
        let config = GatewayConfig {
            routes: vec![
                RouteConfig {
                    prefix: "/api/pacientes".to_string(),
                    upstream: spawn_upstream().await,
                },
                RouteConfig {
                    prefix: "/api/cups".to_string(),
                    upstream: dead_upstream().await,
                },
            ],
            upstream_timeout_seconds: 5,
            ..GatewayConfig::default()
        };
        let signer = TokenSigner::from_secret(Some(SECRET), 600).expect("signer");
        let state = GatewayState::new(&config, signer, Arc::new(MemoryRevocationStore::new()))
            .expect("state");
        (router(state.clone()), state)
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _) = gateway().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "gateway");
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_401() {
        let (app, _) = gateway().await;
        let (status, body) = send(&app, "GET", "/api/pacientes", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, "GET", "/api/pacientes", None, Some("not.a.token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_token_is_forwarded() {
        let (app, state) = gateway().await;
        let (token, _) = state
            .signer
            .issue("ana", 2, vec!["MEDICO".to_string()])
            .expect("issue");

        let (status, body) = send(&app, "GET", "/api/pacientes?size=5", None, Some(&token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["uri"], "/api/pacientes?size=5");
        assert_eq!(body["data"]["authorized"], true);
    }

    #[tokio::test]
    async fn test_revoked_token_is_401() {
        let (app, state) = gateway().await;
        let (token, claims) = state.signer.issue("ana", 2, vec![]).expect("issue");
        state
            .revocations
            .revoke(&claims.jti, Duration::from_secs(60))
            .await
            .expect("revoke");

        let (status, body) = send(&app, "GET", "/api/pacientes", None, Some(&token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token has been revoked");
    }

    #[tokio::test]
    async fn test_unrouted_is_404_and_dead_upstream_is_502() {
        let (app, state) = gateway().await;
        let (token, _) = state.signer.issue("ana", 2, vec![]).expect("issue");

        let (status, _) = send(&app, "GET", "/api/desconocido", None, Some(&token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, "GET", "/api/cups", None, Some(&token)).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn test_public_paths() {
        let signer = TokenSigner::from_secret(Some(SECRET), 600).expect("signer");
        let state = GatewayState::new(
            &GatewayConfig::default(),
            signer,
            Arc::new(MemoryRevocationStore::new()),
        )
        .expect("state");
        assert!(state.is_public("/api/auth/login"));
        assert!(state.is_public("/api/auth/register/"));
        assert!(!state.is_public("/api/auth/logout"));
        assert!(!state.is_public("/api/pacientes"));
    }
}
