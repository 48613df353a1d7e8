use super::NoProxyList;

/// Environment variable holding the proxy URI (lowercase only)
pub const HTTP_PROXY_ENV: &str = "http_proxy";

/// Environment variable holding the comma-separated exclusion list
pub const NO_PROXY_ENV: &str = "no_proxy";

/// Point-in-time copy of the proxy-related environment.
///
/// Proxy resolution never reads process state itself; callers capture a
/// snapshot once per resolution (or build one explicitly in tests) and pass
/// it in. Only the lowercase variable names are consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    http_proxy: Option<String>,
    no_proxy: Option<String>,
}

impl EnvSnapshot {
    /// Snapshot with no proxy variables set
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read `http_proxy` and `no_proxy` from the process environment
    #[must_use]
    pub fn capture() -> Self {
        Self {
            http_proxy: std::env::var(HTTP_PROXY_ENV).ok(),
            no_proxy: std::env::var(NO_PROXY_ENV).ok(),
        }
    }

    #[must_use]
    pub fn with_http_proxy(mut self, value: impl Into<String>) -> Self {
        self.http_proxy = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_no_proxy(mut self, value: impl Into<String>) -> Self {
        self.no_proxy = Some(value.into());
        self
    }

    /// Proxy URI, or `None` when unset or blank
    #[must_use]
    pub fn http_proxy(&self) -> Option<&str> {
        self.http_proxy
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    #[must_use]
    pub fn no_proxy(&self) -> NoProxyList {
        self.no_proxy
            .as_deref()
            .map(NoProxyList::parse)
            .unwrap_or_default()
    }
}
