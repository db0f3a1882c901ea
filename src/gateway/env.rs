//! CGI environment construction.
//!
//! # Responsibilities
//! - Translate an HTTP request into the CGI/FastCGI variable set
//! - Canonicalize header names (`X-Foo` → `HTTP_X_FOO`)
//! - Drop the `Proxy` header (httpoxy, request smuggling)
//!
//! # Design Decisions
//! - Pure function: same request context always yields the same environment
//! - Insertion-ordered map, last write wins on key collision
//! - `Cookie` values joined with `"; "`, everything else with `", "`

use std::net::SocketAddr;
use std::path::Path;

use axum::http::header;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use indexmap::IndexMap;

/// Value of the `SERVER_SOFTWARE` variable handed to backends.
pub const SERVER_SOFTWARE: &str = "cgi-gateway/0.1";

/// Ordered CGI environment, keys unique with last write winning.
pub type CgiEnv = IndexMap<String, String>;

/// Per-request data the environment is derived from.
///
/// Owned by the handling of a single request; never shared.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: HeaderMap,
    pub remote_addr: String,
}

impl RequestContext {
    /// Extract the context from decomposed request parts and the peer address.
    pub fn from_parts(parts: &Parts, remote_addr: SocketAddr) -> Self {
        Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            query: parts.uri.query().unwrap_or("").to_string(),
            headers: parts.headers.clone(),
            remote_addr: remote_addr.to_string(),
        }
    }

    /// Host header value, empty when the client sent none.
    pub fn host(&self) -> &str {
        self.headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    fn content_length(&self) -> Option<u64> {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    }

    fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Map a single header-name character to its environment form.
///
/// Total and pure: lowercase ASCII is uppercased, `-` becomes `_`, and a
/// literal `=` becomes `_` as well since it would corrupt a `KEY=VALUE`
/// environment-string representation. Every other character passes through.
pub fn canonical_env_char(c: char) -> char {
    match c {
        'a'..='z' => c.to_ascii_uppercase(),
        '-' | '=' => '_',
        _ => c,
    }
}

/// Canonicalize a full header name (`Content-MD5` → `CONTENT_MD5`).
pub fn canonical_env_name(name: &str) -> String {
    name.chars().map(canonical_env_char).collect()
}

/// Build the full CGI environment for a request resolving to `script`.
///
/// Total over any well-formed context; header values that are not valid
/// UTF-8 are skipped rather than revalidated here.
pub fn build_env(ctx: &RequestContext, document_root: &Path, script: &Path) -> CgiEnv {
    let mut env = CgiEnv::new();

    env.insert("REQUEST_METHOD".into(), ctx.method.clone());
    env.insert(
        "SCRIPT_FILENAME".into(),
        script.to_string_lossy().into_owned(),
    );
    env.insert("SCRIPT_NAME".into(), ctx.path.clone());
    env.insert("SERVER_SOFTWARE".into(), SERVER_SOFTWARE.into());
    env.insert("REMOTE_ADDR".into(), ctx.remote_addr.clone());
    env.insert("SERVER_PROTOCOL".into(), "HTTP/1.1".into());
    env.insert("PATH_INFO".into(), ctx.path.clone());
    env.insert(
        "DOCUMENT_ROOT".into(),
        document_root.to_string_lossy().into_owned(),
    );
    env.insert("QUERY_STRING".into(), ctx.query.clone());
    env.insert("REQUEST_URI".into(), format!("{}?{}", ctx.path, ctx.query));
    env.insert("HTTP_HOST".into(), ctx.host().to_string());

    // CONTENT_LENGTH / CONTENT_TYPE only when the request declares them;
    // neither is synthesized.
    if let Some(len) = ctx.content_length() {
        if len > 0 {
            env.insert("CONTENT_LENGTH".into(), len.to_string());
        }
    }
    if let Some(ctype) = ctx.content_type() {
        if !ctype.is_empty() {
            env.insert("CONTENT_TYPE".into(), ctype.to_string());
        }
    }

    for name in ctx.headers.keys() {
        let canonical = canonical_env_name(name.as_str());
        if canonical == "PROXY" {
            // See Go issue 16405: a client-supplied Proxy header must never
            // reach the backend environment.
            continue;
        }
        let separator = if canonical == "COOKIE" { "; " } else { ", " };
        let joined = ctx
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect::<Vec<_>>()
            .join(separator);
        env.insert(format!("HTTP_{canonical}"), joined);
    }

    env
}
