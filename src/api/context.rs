//! Purpose: Hold the credential, endpoint, and HTTP collaborator for geocoding calls.
//! Exports: `Context`.
//! Role: Explicit, immutable configuration passed by reference into every operation.
//! Invariants: Fields are never mutated once the value is shared; clones share one inner.
//! Invariants: The credential is never rendered by `Debug`.
#![allow(clippy::result_large_err)]

use std::fmt;
use std::sync::Arc;

use url::Url;

use super::transport::{Transport, UreqTransport};
use crate::core::error::{Error, ErrorKind};
use crate::core::query::{DEFAULT_ENDPOINT, normalize_endpoint};

type ApiResult<T> = Result<T, Error>;

#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    key: String,
    endpoint: Url,
    transport: Arc<dyn Transport>,
}

impl Context {
    /// Creates a context for the public Google endpoint using a default `ureq` agent.
    pub fn new(key: impl Into<String>) -> ApiResult<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::new(ErrorKind::InvalidArgument)
                .with_message("api key must not be empty")
                .with_hint("Pass --key or set GOOGLE_MAPS_API_KEY."));
        }
        let endpoint = normalize_endpoint(DEFAULT_ENDPOINT)?;
        Ok(Self {
            inner: Arc::new(ContextInner {
                key,
                endpoint,
                transport: Arc::new(UreqTransport::new()),
            }),
        })
    }

    /// Points requests at another endpoint, e.g. a proxy or a local stub.
    pub fn with_endpoint(self, endpoint: &str) -> ApiResult<Self> {
        let endpoint = normalize_endpoint(endpoint)?;
        Ok(self.rebuild(|inner| inner.endpoint = endpoint))
    }

    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        self.rebuild(|inner| inner.transport = transport)
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    fn rebuild(mut self, update: impl FnOnce(&mut ContextInner)) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            update(inner);
        } else {
            let mut inner = ContextInner {
                key: self.inner.key.clone(),
                endpoint: self.inner.endpoint.clone(),
                transport: Arc::clone(&self.inner.transport),
            };
            update(&mut inner);
            self.inner = Arc::new(inner);
        }
        self
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("key", &"<redacted>")
            .field("endpoint", &self.inner.endpoint.as_str())
            .finish_non_exhaustive()
    }
}
