//! Purpose: Issue the single HTTP GET behind each geocoding call.
//! Exports: `Transport`, `RawResponse`, `UreqTransport`.
//! Role: Transport Invoker seam; the only module in the crate that performs network I/O.
//! Invariants: One `get` is exactly one outbound request; nothing here retries.
//! Invariants: Non-2xx responses are returned, not raised; JSON is never inspected here.
//! Invariants: Timeouts come from the agent configuration, never from callers of `get`.
#![allow(clippy::result_large_err)]

use std::time::Duration;

use tracing::trace;
use url::Url;

use crate::core::error::{Error, ErrorKind};

const USER_AGENT: &str = concat!("gmaps-geocode/", env!("CARGO_PKG_VERSION"));

/// Status code and body of one HTTP exchange.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP collaborator used by `Context`.
///
/// Implementations must issue exactly one GET per call and report connection-level
/// failures as `ErrorKind::Transport`.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<RawResponse, Error>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[derive(Clone, Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::from_agent(ureq::AgentBuilder::new().user_agent(USER_AGENT).build())
    }

    /// Applies an overall per-request timeout (connect, send, and read).
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_agent(
            ureq::AgentBuilder::new()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build(),
        )
    }

    /// Wraps a caller-configured agent; its settings, user agent included, are used as-is.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        let response = self
            .agent
            .request("GET", url.as_str())
            .set("Accept", "application/json")
            .call();

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(_, resp)) => resp,
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Transport)
                    .with_message("request failed")
                    .with_source(err));
            }
        };

        let status = response.status();
        trace!(status, content_type = response.content_type(), "response headers received");
        let body = response.into_string().map_err(|err| {
            Error::new(ErrorKind::Transport)
                .with_message("failed to read response body")
                .with_http_status(status)
                .with_source(err)
        })?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::{RawResponse, Transport, UreqTransport};
    use crate::core::error::ErrorKind;
    use std::net::TcpListener;
    use url::Url;

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(403, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }

    #[test]
    fn connection_refused_is_transport_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/maps/api/geocode/json?key=k"))
            .expect("url");
        let err = UreqTransport::new().get(&url).expect_err("refused");
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.http_status(), None);
    }
}
