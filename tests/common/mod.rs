//! Shared utilities for integration tests.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use bytes::Bytes;
use tower::ServiceExt;

use cgi_gateway::gateway::env::CgiEnv;
use cgi_gateway::transport::FcgiTransport;

/// Transport double: returns a canned payload (or refuses) and records
/// every environment/body pair it was handed.
pub struct MockTransport {
    response: Option<Vec<u8>>,
    pub captured: Mutex<Vec<(CgiEnv, Bytes)>>,
}

impl MockTransport {
    /// A transport that always replies with `payload`.
    pub fn replying(payload: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            response: Some(payload.to_vec()),
            captured: Mutex::new(Vec::new()),
        })
    }

    /// A transport whose connection always fails.
    #[allow(dead_code)]
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            captured: Mutex::new(Vec::new()),
        })
    }

    /// Environments captured so far.
    #[allow(dead_code)]
    pub fn environments(&self) -> Vec<CgiEnv> {
        self.captured
            .lock()
            .unwrap()
            .iter()
            .map(|(env, _)| env.clone())
            .collect()
    }
}

#[async_trait]
impl FcgiTransport for MockTransport {
    async fn exchange(&self, env: CgiEnv, body: Bytes) -> io::Result<Vec<u8>> {
        self.captured.lock().unwrap().push((env, body));
        match &self.response {
            Some(payload) => Ok(payload.clone()),
            None => Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "mock backend refused connection",
            )),
        }
    }
}

/// Drive one request through the router, supplying connect info the way
/// a real listener would.
pub async fn send(router: Router, mut request: Request<Body>) -> Response {
    let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    router.oneshot(request).await.unwrap()
}

/// Collect a response body into memory.
pub async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}
