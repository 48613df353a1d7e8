use thiserror::Error;

/// Classification of URL resolution failures.
///
/// Provides programmatic matching for different failure modes without
/// relying on unstable error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUrlKind {
    /// URL could not be parsed (malformed syntax)
    ParseError,
    /// Neither the connection nor the request supplied a host
    MissingHost,
    /// URL is missing a scheme or uses one that cannot carry a host
    MissingScheme,
}

/// Connection error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConnectionError {
    /// The final request URL could not be resolved.
    ///
    /// Use the `kind` field for programmatic matching. The `reason` field contains
    /// a diagnostic message intended for logging only.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL (or URL fragment) that failed to resolve
        url: String,
        /// Structured failure classification for programmatic matching
        kind: InvalidUrlKind,
        /// Diagnostic message (unstable format, for logging only)
        reason: String,
    },

    /// A proxy value did not produce a URI with a host.
    ///
    /// Raised when the proxy is assigned, never deferred to request time.
    /// An unusable `http_proxy` environment value is reported the same way
    /// when a request resolves its proxy.
    #[error("Invalid proxy configuration '{value}': {reason}")]
    InvalidProxyConfig {
        /// The rejected proxy value (credentials are never included)
        value: String,
        /// Reason the value was rejected
        reason: String,
    },

    /// A configuration setter received a malformed value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Converting a request descriptor into an `http::Request` failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// A request was dispatched on a connection without an execution pipeline
    #[error("No execution pipeline configured for this connection")]
    NoPipeline,

    /// Error reported by the external execution pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ConnectionError {
    pub(crate) fn invalid_url(
        url: impl Into<String>,
        kind: InvalidUrlKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            kind,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_proxy(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidProxyConfig {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct TestError(&'static str);

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl Error for TestError {}

    #[test]
    fn test_pipeline_error_preserves_source() {
        let err = ConnectionError::Pipeline(Box::new(TestError("connection refused")));

        let source = err.source().unwrap();
        let downcast = source.downcast_ref::<TestError>();
        assert_eq!(downcast.unwrap().0, "connection refused");
    }

    #[test]
    fn test_invalid_url_display() {
        let err = ConnectionError::invalid_url("sake.html", InvalidUrlKind::MissingHost, "no host");
        assert_eq!(err.to_string(), "Invalid URL 'sake.html': no host");
        assert!(matches!(
            err,
            ConnectionError::InvalidUrl {
                kind: InvalidUrlKind::MissingHost,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_proxy_display() {
        let err = ConnectionError::invalid_proxy("http://", "missing host");
        assert_eq!(
            err.to_string(),
            "Invalid proxy configuration 'http://': missing host"
        );
    }
}
