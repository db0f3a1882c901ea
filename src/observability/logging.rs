//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Honor RUST_LOG, falling back to the configured directive
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Environment overrides config so operators can raise verbosity
//!   without touching files

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from the environment, or from `default_directive` when
/// `RUST_LOG` is unset.
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Initialize the global subscriber.
///
/// `default_directive` is used when `RUST_LOG` is unset.
pub fn init(default_directive: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
