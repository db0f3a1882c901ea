//! Static file serving delegation.
//!
//! # Design Decisions
//! - `tower_http::services::ServeFile` owns content types, ranges and the
//!   not-found surface; the gateway never synthesizes its own 404 here

use std::path::Path;

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Serve a resolved filesystem path for the given request.
pub async fn serve(path: &Path, request: Request<Body>) -> Response {
    match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response.map(Body::new).into_response(),
        Err(infallible) => match infallible {},
    }
}
