//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via tracing; the request ID flows through every
//!   handler event
//! - No metrics endpoint in this gateway

pub mod logging;
