//! Shared HTTP plumbing for remote backends.
//!
//! Both the remote plan catalog and the REST subscription store send their
//! requests through one pooled client and the same base-URL validation.

use std::{fmt, sync::LazyLock, time::Duration};

use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::error::{GateError, Result};

/// Shared HTTP client with connection pooling enabled.
///
/// Using a singleton avoids recreating the client per backend instance,
/// preserving connection pooling benefits across catalog and store requests.
static HTTP_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .pool_max_idle_per_host(100)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to create shared HTTP client")
});

/// Returns the shared pooled client.
pub(crate) fn client() -> Client {
    HTTP_CLIENT.clone()
}

/// Validates a backend base URL and normalizes it for path concatenation.
///
/// Ensures the URL parses, uses HTTPS, does not point at localhost, and
/// carries no traversal sequences. Returns the URL with any trailing slash
/// trimmed so endpoints can be appended as `{base}/segment`.
pub(crate) fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| GateError::InvalidConfig(format!("invalid base_url '{raw}': {e}")))?;

    if url.scheme() != "https" {
        return Err(GateError::InvalidConfig(format!(
            "base_url must use HTTPS: {raw}"
        )));
    }

    if let Some(host) = url.host_str()
        && (host == "localhost" || host == "127.0.0.1" || host == "::1" || host == "[::1]")
    {
        return Err(GateError::InvalidConfig(format!(
            "base_url must not point at localhost: {raw}"
        )));
    }

    if url.host_str().is_none() {
        return Err(GateError::InvalidConfig(format!("base_url missing host: {raw}")));
    }

    // The parser resolves ".." segments away, so traversal is checked on
    // the raw text, which is what path concatenation reuses below.
    if raw.contains("..") || url.path().contains("//") {
        return Err(GateError::InvalidConfig(format!(
            "base_url contains traversal sequences: {raw}"
        )));
    }

    Ok(raw.trim_end_matches('/').to_owned())
}

/// Validates a header value for CRLF injection prevention.
pub(crate) fn validate_header_value(value: &str) -> Result<()> {
    if value.contains('\r') || value.contains('\n') || value.contains('\0') {
        return Err(GateError::InvalidConfig(
            "auth header value contains control characters".to_owned(),
        ));
    }
    Ok(())
}

/// A resolved authentication header attached to every backend request.
///
/// The value comes from an environment variable at construction time and is
/// redacted from debug output.
#[derive(Clone)]
pub(crate) struct AuthHeader {
    name: String,
    value: String,
}

impl AuthHeader {
    /// Creates an auth header after validating its value.
    pub(crate) fn new(name: String, value: String) -> Result<Self> {
        validate_header_value(&value)?;
        Ok(Self { name, value })
    }

    /// Attaches this header to a request.
    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(&self.name, &self.value)
    }
}

impl fmt::Debug for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeader")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .finish()
    }
}
