//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the protocol-translation core
//! - Map every failure path to a concrete HTTP status

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use bytes::Bytes;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::gateway::env::{build_env, RequestContext};
use crate::gateway::response::parse_response;
use crate::gateway::{Dispatch, Dispatcher};
use crate::http::request::{RequestIdLayer, X_REQUEST_ID};
use crate::transport::{FastCgiTransport, FcgiTransport};
use crate::{exec, static_files};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub dispatcher: Arc<Dispatcher>,
    pub transport: Arc<dyn FcgiTransport>,
}

/// HTTP server for the CGI gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and the
    /// production FastCGI transport.
    pub fn new(config: GatewayConfig) -> Self {
        let transport = Arc::new(FastCgiTransport::new(config.upstream.clone()));
        Self::with_transport(config, transport)
    }

    /// Create a server with an injected transport (tests use this).
    pub fn with_transport(config: GatewayConfig, transport: Arc<dyn FcgiTransport>) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(&config.dispatch));
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            dispatcher,
            transport,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root = %self.config.dispatch.root.display(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Clone of the underlying router, for driving requests in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Main gateway handler.
/// Classifies the request, then serves, executes, or forwards it.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let path = request.uri().path().to_string();
    let method = request.method().clone();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Dispatching request"
    );

    match state.dispatcher.dispatch(&path) {
        Dispatch::Denied => {
            tracing::warn!(request_id = %request_id, path = %path, "Path escapes document root");
            (StatusCode::FORBIDDEN, "Path outside document root").into_response()
        }

        Dispatch::Static { path: target } => {
            tracing::debug!(request_id = %request_id, target = %target.display(), "Serving static file");
            static_files::serve(&target, request).await
        }

        Dispatch::Local {
            interpreter,
            script,
        } => {
            let body = match buffer_body(&state, request).await {
                Ok((_, body)) => body,
                Err(response) => return response,
            };
            let root = &state.config.dispatch.root;
            match exec::run_cgi(&interpreter, &script, root, &path, body).await {
                Ok(raw) => cgi_payload_response(&request_id, &raw),
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, script = %script.display(), "CGI execution failed");
                    (StatusCode::BAD_GATEWAY, "CGI execution failed").into_response()
                }
            }
        }

        Dispatch::Remote { script } => {
            let (parts, body) = match buffer_body(&state, request).await {
                Ok(buffered) => buffered,
                Err(response) => return response,
            };
            let ctx = RequestContext::from_parts(&parts, addr);
            let env = build_env(&ctx, &state.config.dispatch.root, &script);

            match state.transport.exchange(env, body).await {
                Ok(raw) => cgi_payload_response(&request_id, &raw),
                Err(e) => {
                    tracing::error!(request_id = %request_id, error = %e, "FastCGI upstream error");
                    (StatusCode::BAD_GATEWAY, "FastCGI upstream request failed").into_response()
                }
            }
        }
    }
}

/// Buffer the request body up to the configured limit.
async fn buffer_body(
    state: &AppState,
    request: Request<Body>,
) -> Result<(axum::http::request::Parts, Bytes), Response> {
    let limit = state.config.limits.max_body_bytes;
    let (parts, body) = request.into_parts();
    match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => Ok((parts, bytes)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to buffer request body");
            Err((StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response())
        }
    }
}

/// Turn a raw CGI-style payload into the client-facing HTTP response.
fn cgi_payload_response(request_id: &str, raw: &[u8]) -> Response {
    let parsed = match parse_response(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Unparseable backend response");
            return (StatusCode::BAD_GATEWAY, "cannot parse FastCGI response").into_response();
        }
    };

    let status = match StatusCode::from_u16(parsed.status) {
        Ok(status) => status,
        Err(_) => {
            tracing::error!(request_id = %request_id, status = parsed.status, "Backend status out of range");
            return (StatusCode::BAD_GATEWAY, "Invalid backend status").into_response();
        }
    };
    let mut builder = Response::builder().status(status);
    for (name, value) in &parsed.headers {
        builder = builder.header(name, value);
    }

    match builder.body(Body::from(parsed.body)) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Backend response headers rejected");
            (StatusCode::BAD_GATEWAY, "Invalid backend response headers").into_response()
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
