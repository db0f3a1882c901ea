//! Remote FastCGI path: environment delivery, response translation,
//! and explicit failure mapping.

use std::fs;
use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tempfile::TempDir;

use cgi_gateway::config::{ExecMode, GatewayConfig};
use cgi_gateway::http::HttpServer;

mod common;

fn remote_config(root: &TempDir) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.dispatch.root = root.path().to_path_buf();
    config.dispatch.mode = ExecMode::Remote;
    config
        .dispatch
        .interpreters
        .insert(".php".into(), PathBuf::from("/usr/bin/php-cgi"));
    config
}

fn write_script(root: &TempDir) -> PathBuf {
    let script = root.path().join("app.php");
    fs::write(&script, "<?php ?>").unwrap();
    script
}

#[tokio::test]
async fn test_backend_response_is_translated() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    let transport =
        common::MockTransport::replying(b"Status: 404 Not Found\nX-Foo: bar\r\n\r\nhello");
    let server = HttpServer::with_transport(remote_config(&root), transport);

    let response = common::send(
        server.router(),
        Request::get("/app.php").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["X-Foo"], "bar");
    assert!(!response.headers().contains_key("Status"));
    assert_eq!(common::read_body(response).await, b"hello");
}

#[tokio::test]
async fn test_statusless_response_defaults_to_200() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    let transport = common::MockTransport::replying(b"Content-Type: text/plain\r\n\r\nok");
    let server = HttpServer::with_transport(remote_config(&root), transport);

    let response = common::send(
        server.router(),
        Request::get("/app.php").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["Content-Type"], "text/plain");
    assert_eq!(common::read_body(response).await, b"ok");
}

#[tokio::test]
async fn test_unparseable_payload_maps_to_502() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    // No header/body delimiter at all.
    let transport = common::MockTransport::replying(b"X-Foo: bar");
    let server = HttpServer::with_transport(remote_config(&root), transport);

    let response = common::send(
        server.router(),
        Request::get("/app.php").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(common::read_body(response).await, b"cannot parse FastCGI response");
}

#[tokio::test]
async fn test_transport_failure_maps_to_502() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    let transport = common::MockTransport::failing();
    let server = HttpServer::with_transport(remote_config(&root), transport);

    let response = common::send(
        server.router(),
        Request::get("/app.php").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        common::read_body(response).await,
        b"FastCGI upstream request failed"
    );
}

#[tokio::test]
async fn test_environment_reaches_the_transport() {
    let root = TempDir::new().unwrap();
    let script = write_script(&root);

    let transport = common::MockTransport::replying(b"\r\n\r\nok");
    let server = HttpServer::with_transport(remote_config(&root), transport.clone());

    let response = common::send(
        server.router(),
        Request::post("/app.php?x=1")
            .header("Host", "gateway.test")
            .header("Content-Type", "text/plain")
            .header("Cookie", "a=1")
            .header("Cookie", "b=2")
            .header("Proxy", "evil:3128")
            .body(Body::from("payload"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let captured = transport.captured.lock().unwrap();
    assert_eq!(captured.len(), 1);
    let (env, body) = &captured[0];

    assert_eq!(env["REQUEST_METHOD"], "POST");
    assert_eq!(env["SCRIPT_FILENAME"], script.to_string_lossy());
    assert_eq!(env["SCRIPT_NAME"], "/app.php");
    assert_eq!(env["QUERY_STRING"], "x=1");
    assert_eq!(env["REQUEST_URI"], "/app.php?x=1");
    assert_eq!(env["HTTP_HOST"], "gateway.test");
    assert_eq!(env["HTTP_COOKIE"], "a=1; b=2");
    assert_eq!(env["CONTENT_TYPE"], "text/plain");
    assert!(!env.contains_key("HTTP_PROXY"));
    assert_eq!(&body[..], b"payload");
}

#[tokio::test]
async fn test_out_of_range_status_maps_to_502() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    // 99 parses but is not a representable HTTP status.
    let transport = common::MockTransport::replying(b"Status: 99 Weird\r\n\r\nbody");
    let server = HttpServer::with_transport(remote_config(&root), transport);

    let response = common::send(
        server.router(),
        Request::get("/app.php").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(common::read_body(response).await, b"Invalid backend status");
}

#[tokio::test]
async fn test_default_app_env_for_missing_nested_path() {
    let root = TempDir::new().unwrap();
    let front = root.path().join("front.php");
    fs::write(&front, "<?php ?>").unwrap();

    let transport = common::MockTransport::replying(b"\r\n\r\nok");
    let mut config = remote_config(&root);
    config.dispatch.default_app = Some(front.clone());

    let server = HttpServer::with_transport(config, transport.clone());
    let response = common::send(
        server.router(),
        Request::get("/missing/dir/").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The script filename is the substituted app, while the name and URI
    // keep the original request path.
    let envs = transport.environments();
    assert_eq!(envs.len(), 1);
    assert_eq!(envs[0]["SCRIPT_FILENAME"], front.to_string_lossy());
    assert_eq!(envs[0]["SCRIPT_NAME"], "/missing/dir/");
    assert_eq!(envs[0]["REQUEST_URI"], "/missing/dir/?");
}

#[tokio::test]
async fn test_oversized_body_is_rejected_before_the_backend() {
    let root = TempDir::new().unwrap();
    write_script(&root);

    let transport = common::MockTransport::replying(b"\r\n\r\nok");
    let mut config = remote_config(&root);
    config.limits.max_body_bytes = 8;

    let server = HttpServer::with_transport(config, transport.clone());
    let response = common::send(
        server.router(),
        Request::post("/app.php")
            .body(Body::from(vec![0u8; 64]))
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(transport.captured.lock().unwrap().is_empty());
}
