// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::GatewayState;
use crate::common::config::RouteConfig;
use crate::{PlatformError, PlatformResult};
use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

/// Largest request body forwarded upstream.
pub const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Headers that only describe a single connection and must not be relayed.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub prefix: String,
    pub upstream: String,
}

impl Route {
    fn matches(&self, path: &str) -> bool {
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

/// Prefix routes, longest prefix first.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(config: &[RouteConfig]) -> PlatformResult<Self> {
        let mut routes = Vec::with_capacity(config.len());
        for entry in config {
            let prefix = entry.prefix.trim_end_matches('/').to_string();
            if !prefix.starts_with('/') {
                return Err(PlatformError::Validation(format!(
                    "route prefix '{}' must start with '/'",
                    entry.prefix
                )));
            }
            if !(entry.upstream.starts_with("http://") || entry.upstream.starts_with("https://")) {
                return Err(PlatformError::Validation(format!(
                    "upstream '{}' must be an http(s) URL",
                    entry.upstream
                )));
            }
            routes.push(Route {
                prefix,
                upstream: entry.upstream.trim_end_matches('/').to_string(),
            });
        }
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { routes })
    }

    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }
}

/// Fallback handler: relay the request to the upstream owning its path.
pub async fn forward(State(state): State<GatewayState>, request: Request) -> Response {
    match relay(&state, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn relay(state: &GatewayState, request: Request) -> PlatformResult<Response> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();
    let route = state
        .routes
        .resolve(path)
        .ok_or_else(|| PlatformError::NotFound(format!("No route for {path}")))?;
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(path);
    let url = format!("{}{}", route.upstream, path_and_query);

    let method = reqwest::Method::from_bytes(parts.method.as_str().as_bytes())
        .map_err(|e| PlatformError::Validation(format!("Unsupported method: {e}")))?;
    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| PlatformError::Validation(format!("Failed to read request body: {e}")))?;

    let mut upstream_request = state.client.request(method, &url).body(body.to_vec());
    for (name, value) in parts.headers.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        upstream_request = upstream_request.header(name.as_str(), value.as_bytes());
    }

    debug!("Forwarding {} {} to {}", parts.method, path, url);
    let upstream_response = upstream_request.send().await.map_err(|e| {
        PlatformError::Upstream(format!("Upstream {} unavailable: {e}", route.upstream))
    })?;

    let status = StatusCode::from_u16(upstream_response.status().as_u16())
        .map_err(|e| PlatformError::Upstream(format!("Invalid upstream status: {e}")))?;
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream_response.headers() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    let bytes = upstream_response
        .bytes()
        .await
        .map_err(|e| PlatformError::Upstream(format!("Failed to read upstream body: {e}")))?;

    builder
        .body(Body::from(bytes.to_vec()))
        .map_err(|e| PlatformError::Internal(format!("Failed to build response: {e}")))
}

#[cfg(test)]
mod test {
    use super::*;

    fn table() -> RouteTable {
        let route = |prefix: &str, upstream: &str| RouteConfig {
            prefix: prefix.to_string(),
            upstream: upstream.to_string(),
        };
        RouteTable::new(&[
            route("/api", "http://fallback:9000"),
            route("/api/auth", "http://auth:8083/"),
            route("/api/auth/admin", "http://admin:8084"),
        ])
        .expect("table")
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = table();
        let upstream = |path: &str| table.resolve(path).expect("route").upstream.clone();
        assert_eq!(upstream("/api/auth/login"), "http://auth:8083");
        assert_eq!(upstream("/api/auth/admin/x"), "http://admin:8084");
        assert_eq!(upstream("/api/citas"), "http://fallback:9000");
        assert!(table.resolve("/health").is_none());
    }

    #[test]
    fn test_prefix_matches_whole_segments() {
        let table = table();
        assert_eq!(table.resolve("/api/authx").expect("route").prefix, "/api");
        assert_eq!(table.resolve("/api/auth").expect("route").prefix, "/api/auth");
    }

    #[test]
    fn test_bad_routes_rejected() {
        let bad = RouteConfig {
            prefix: "api".to_string(),
            upstream: "http://x".to_string(),
        };
        assert!(RouteTable::new(&[bad]).is_err());
        let bad = RouteConfig {
            prefix: "/api".to_string(),
            upstream: "ftp://x".to_string(),
        };
        assert!(RouteTable::new(&[bad]).is_err());
    }

    #[test]
    fn test_hop_by_hop() {
        assert!(is_hop_by_hop("Connection"));
        assert!(is_hop_by_hop("transfer-encoding"));
        assert!(!is_hop_by_hop("authorization"));
    }
}
