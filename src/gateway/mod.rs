//! Protocol-translation core.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → dispatch.rs (resolve under root, classify via route.rs)
//!     → Local  : exec collaborator runs the interpreter
//!     → Remote : env.rs builds the CGI environment
//!                → transport collaborator exchanges it
//!                → response.rs decodes the raw payload
//!     → Static : file-serving collaborator takes over
//! ```
//!
//! # Design Decisions
//! - Every piece here is pure or read-only; no shared mutable state
//! - Wire transport, process execution and file serving are collaborators,
//!   not part of this core

pub mod dispatch;
pub mod env;
pub mod response;
pub mod route;

pub use dispatch::{Dispatch, Dispatcher};
pub use env::{build_env, canonical_env_name, CgiEnv, RequestContext};
pub use response::{parse_response, ParsedResponse, ResponseParseError};
pub use route::RouteTable;
