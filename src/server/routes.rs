//! Route handlers and middleware
//!
//! The fallback handler turns an axum request into a `CapsRequest` and runs
//! the registry on the blocking pool, since store and transcoder calls are
//! synchronous.

use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use super::http::ServerState;
use crate::caps::{CapsRequest, CapsUrls};
use crate::core::CapsError;

const ENDPOINT_NOT_FOUND: &str = "endpoint not found";

impl IntoResponse for CapsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, [(header::CONTENT_TYPE, "text/plain")], self.to_string()).into_response()
    }
}

/// Fallback: route the request through the capability registry
pub async fn dispatch_caps(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = CapsRequest {
        method,
        path: uri.path().to_string(),
        query,
        headers,
        body,
    };

    let registry = std::sync::Arc::clone(state.caps.registry());
    let outcome = tokio::task::spawn_blocking(move || registry.dispatch(&request)).await;

    match outcome {
        Ok(Ok(response)) => response.into_response(),
        Ok(Err(e)) => {
            let err = CapsError::from(e);
            tracing::debug!("{}", err);
            if err.is_not_found() {
                (StatusCode::NOT_FOUND, ENDPOINT_NOT_FOUND).into_response()
            } else {
                err.into_response()
            }
        }
        Err(e) => {
            tracing::error!("Capability dispatch task failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Route: POST /agents/:agent_id/caps
pub async fn issue_caps(
    State(state): State<ServerState>,
    Path(agent_id): Path<Uuid>,
) -> Result<Json<CapsUrls>, CapsError> {
    let urls = state.caps.issue_capabilities(agent_id)?;
    Ok(Json(urls))
}

/// Route: DELETE /agents/:agent_id/caps
pub async fn revoke_caps(
    State(state): State<ServerState>,
    Path(agent_id): Path<Uuid>,
) -> StatusCode {
    if state.caps.revoke_capabilities(agent_id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Response headers added to every answer
pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    // Prevent MIME type sniffing of served asset bytes
    response.headers_mut().insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );

    response
}
