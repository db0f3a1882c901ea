//! CGI/FastCGI HTTP gateway library.
//!
//! Per request, the gateway serves a static file, runs a local script
//! through the CGI convention, or forwards to a remote FastCGI backend,
//! translating between HTTP and the CGI environment/response formats.

pub mod config;
pub mod exec;
pub mod gateway;
pub mod http;
pub mod observability;
pub mod static_files;
pub mod transport;

pub use config::GatewayConfig;
pub use gateway::{Dispatch, Dispatcher};
pub use http::HttpServer;
pub use transport::{FastCgiTransport, FcgiTransport};
