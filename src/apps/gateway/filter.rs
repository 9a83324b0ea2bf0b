// Copyright (c), Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::GatewayState;
use crate::common::token::authenticate;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Request filter in front of every gateway route. Public paths pass
/// through; everything else needs a valid, unrevoked bearer token. One log
/// line per request.
pub async fn authenticate_request(
    State(state): State<GatewayState>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = if state.is_public(&path) {
        next.run(request).await
    } else {
        let verdict =
            authenticate(request.headers(), &state.signer, state.revocations.as_ref()).await;
        match verdict {
            Ok(claims) => {
                debug!("{} {} authorized for {}", method, path, claims.sub);
                next.run(request).await
            }
            Err(e) => {
                warn!("{} {} rejected: {}", method, path, e);
                e.into_response()
            }
        }
    };

    info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
