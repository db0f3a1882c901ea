//! Local CGI process execution.
//!
//! # Responsibilities
//! - Spawn the configured interpreter with the script as sole argument
//! - Provide the minimal CGI environment and the request body on stdin
//! - Capture stdout for the response parser, log stderr
//!
//! # Design Decisions
//! - One process per request, no pooling
//! - No sandboxing or resource limits; the interpreter is trusted config

use std::io;
use std::path::Path;
use std::process::Stdio;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Run `interpreter script` and return its raw CGI-style output.
///
/// `script_name` is the original URL path, kept distinct from the resolved
/// filesystem location in `script`.
pub async fn run_cgi(
    interpreter: &Path,
    script: &Path,
    document_root: &Path,
    script_name: &str,
    body: Bytes,
) -> io::Result<Vec<u8>> {
    let mut child = Command::new(interpreter)
        .arg(script)
        .current_dir(document_root)
        .env("SCRIPT_FILENAME", script)
        .env("SCRIPT_NAME", script_name)
        .env("DOCUMENT_ROOT", document_root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&body).await?;
        // Closing stdin lets the script observe EOF.
        drop(stdin);
    }

    let output = child.wait_with_output().await?;

    if !output.stderr.is_empty() {
        tracing::warn!(
            script = %script.display(),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "CGI script wrote to stderr"
        );
    }
    if !output.status.success() {
        tracing::warn!(
            script = %script.display(),
            status = ?output.status.code(),
            "CGI script exited with non-zero status"
        );
    }

    Ok(output.stdout)
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_script_output_is_captured() {
        let root = TempDir::new().unwrap();
        let script = root.path().join("hello.sh");
        fs::write(
            &script,
            "printf 'Content-Type: text/plain\\r\\n\\r\\nhello from cgi'\n",
        )
        .unwrap();

        let out = run_cgi(
            Path::new("/bin/sh"),
            &script,
            root.path(),
            "/hello.sh",
            Bytes::new(),
        )
        .await
        .unwrap();
        assert_eq!(out, b"Content-Type: text/plain\r\n\r\nhello from cgi");
    }

    #[tokio::test]
    async fn test_body_reaches_stdin() {
        let root = TempDir::new().unwrap();
        let script = root.path().join("echo.sh");
        fs::write(&script, "printf 'X: y\\r\\n\\r\\n'; cat\n").unwrap();

        let out = run_cgi(
            Path::new("/bin/sh"),
            &script,
            root.path(),
            "/echo.sh",
            Bytes::from_static(b"payload"),
        )
        .await
        .unwrap();
        assert!(out.ends_with(b"payload"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_an_error() {
        let root = TempDir::new().unwrap();
        let result = run_cgi(
            Path::new("/no/such/interpreter"),
            Path::new("script"),
            root.path(),
            "/script",
            Bytes::new(),
        )
        .await;
        assert!(result.is_err());
    }
}
