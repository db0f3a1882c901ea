//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parseable)
//! - Check interpreter table shape (keys carry the leading dot)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function over the config
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::{ExecMode, GatewayConfig};

/// A single semantic problem found in a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    ExtensionMissingDot(String),
    EmptyInterpreter(String),
    MissingUpstream,
    ZeroTimeout,
    ZeroBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address is not a socket address: {addr}")
            }
            ValidationError::ExtensionMissingDot(ext) => {
                write!(f, "interpreter extension must start with '.': {ext}")
            }
            ValidationError::EmptyInterpreter(ext) => {
                write!(f, "interpreter path for {ext} is empty")
            }
            ValidationError::MissingUpstream => {
                write!(f, "mode is fastcgi but no upstream address or socket is set")
            }
            ValidationError::ZeroTimeout => write!(f, "timeouts.request_secs must be > 0"),
            ValidationError::ZeroBodyLimit => write!(f, "limits.max_body_bytes must be > 0"),
        }
    }
}

/// Check a parsed config for semantic problems, reporting every one found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (ext, interpreter) in &config.dispatch.interpreters {
        if !ext.starts_with('.') {
            errors.push(ValidationError::ExtensionMissingDot(ext.clone()));
        }
        if interpreter.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyInterpreter(ext.clone()));
        }
    }

    if config.dispatch.mode == ExecMode::Remote
        && config.upstream.address.is_empty()
        && config.upstream.unix_socket.is_none()
    {
        errors.push(ValidationError::MissingUpstream);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
