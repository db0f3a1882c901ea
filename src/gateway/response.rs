//! CGI/FastCGI response parsing.
//!
//! # Responsibilities
//! - Split a raw backend payload into header block and body
//! - Extract the `Status:` pseudo-header (default 200)
//! - Tolerate malformed header lines; only a missing delimiter is fatal
//!
//! # Design Decisions
//! - The sole failure mode is the absent `\r\n\r\n` delimiter
//! - Header names keep the casing the backend sent
//! - Duplicate header names: last occurrence wins

use indexmap::IndexMap;

/// Structured form of a CGI-style response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: Vec<u8>,
}

/// The raw payload had no header/body delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseParseError;

impl std::fmt::Display for ResponseParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot parse FastCGI response")
    }
}

impl std::error::Error for ResponseParseError {}

/// Decode a raw backend payload into status, headers and body.
pub fn parse_response(raw: &[u8]) -> Result<ParsedResponse, ResponseParseError> {
    let delimiter = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .ok_or(ResponseParseError)?;

    let head = String::from_utf8_lossy(&raw[..delimiter]);
    let body = raw[delimiter + 4..].to_vec();

    let mut status = 200u16;
    let mut headers = IndexMap::new();

    for (index, line) in head.split('\n').enumerate() {
        let line = line.strip_suffix('\r').unwrap_or(line);

        if index == 0 {
            if let Some(rest) = line.strip_prefix("Status:") {
                // A malformed numeric keeps the 200 default instead of
                // aborting the parse.
                if let Some(code) = rest.split_whitespace().next() {
                    if let Ok(code) = code.parse() {
                        status = code;
                    }
                }
            }
        }

        let Some((name, value)) = line.split_once(':') else {
            // Not a header line; skipped, not an error.
            continue;
        };
        if name == "Status" {
            // Consumed as the status line, never re-emitted as a header.
            continue;
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }

    Ok(ParsedResponse {
        status,
        headers,
        body,
    })
}
