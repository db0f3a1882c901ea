//! FastCGI wire transport.
//!
//! # Responsibilities
//! - Connect to the configured backend (TCP, or Unix socket where available)
//! - Hand the built environment and request body to the `fastcgi-client`
//!   crate, which owns record framing and multiplexing
//! - Return the reassembled stdout payload for the response parser
//!
//! # Design Decisions
//! - One connection per request, matching the original gateway
//! - Trait seam so tests can inject canned payloads and failures

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use fastcgi_client::{Client, Params, Request};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
#[cfg(unix)]
use tokio::net::UnixStream;

use crate::config::UpstreamConfig;
use crate::gateway::env::CgiEnv;

/// A single environment-plus-body exchange with a FastCGI backend.
#[async_trait]
pub trait FcgiTransport: Send + Sync {
    /// Send the environment and body, return the raw response payload.
    async fn exchange(&self, env: CgiEnv, body: Bytes) -> io::Result<Vec<u8>>;
}

/// Production transport over the `fastcgi-client` crate.
pub struct FastCgiTransport {
    config: UpstreamConfig,
}

impl FastCgiTransport {
    pub fn new(config: UpstreamConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FcgiTransport for FastCgiTransport {
    async fn exchange(&self, env: CgiEnv, body: Bytes) -> io::Result<Vec<u8>> {
        #[cfg(unix)]
        if let Some(path) = &self.config.unix_socket {
            let stream = UnixStream::connect(path).await?;
            return roundtrip(stream, env, body).await;
        }

        let stream = TcpStream::connect(&self.config.address).await?;
        roundtrip(stream, env, body).await
    }
}

async fn roundtrip<S>(stream: S, env: CgiEnv, body: Bytes) -> io::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let client = Client::new(stream);

    let mut params = Params::default();
    for (key, value) in env {
        params.insert(key.into(), value.into());
    }

    let mut stdin = &body[..];
    let response = client
        .execute_once(Request::new(params, &mut stdin))
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let stderr = response.stderr.unwrap_or_default();
    if !stderr.is_empty() {
        tracing::warn!(
            stderr = %String::from_utf8_lossy(&stderr),
            "FastCGI backend wrote to stderr"
        );
    }

    Ok(response.stdout.unwrap_or_default())
}
