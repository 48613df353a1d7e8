//! Proxy selection
//!
//! A connection's [`ProxySetting`] decides how each request picks its proxy:
//!
//! - [`ProxySetting::Manual`] - an explicitly assigned proxy, used for every
//!   request and never filtered by `no_proxy`
//! - [`ProxySetting::FromEnvironment`] - `http_proxy` from an [`EnvSnapshot`],
//!   skipped for hosts matching the snapshot's [`NoProxyList`]
//! - [`ProxySetting::Disabled`] - never proxy
//!
//! [`resolve_for_request`] is a pure function of the setting, the target host
//! and the snapshot. Nothing is cached between calls.

mod descriptor;
mod env;
mod no_proxy;

pub use descriptor::{ProxyDescriptor, ProxyInput, ProxyOptions};
pub use env::{EnvSnapshot, HTTP_PROXY_ENV, NO_PROXY_ENV};
pub use no_proxy::NoProxyList;

use crate::error::ConnectionError;

/// Proxy state of a connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProxySetting {
    /// Resolve from `http_proxy`/`no_proxy` on every request
    #[default]
    FromEnvironment,
    /// Explicitly assigned proxy; wins over the environment
    Manual(ProxyDescriptor),
    /// Never use a proxy
    Disabled,
}

impl ProxySetting {
    /// Normalise a caller-supplied proxy into a manual setting.
    ///
    /// # Errors
    /// Returns [`ConnectionError::InvalidProxyConfig`] if the input does not
    /// yield a URI with a host.
    pub fn manual(input: impl Into<ProxyInput>) -> Result<Self, ConnectionError> {
        ProxyDescriptor::try_from(input.into()).map(Self::Manual)
    }

    #[must_use]
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

/// Select the proxy for a request to `target_host`.
///
/// `target_host` is `None` when the target has no host yet (a connection
/// without a base URL); exclusion rules then never match.
///
/// # Errors
/// Returns [`ConnectionError::InvalidProxyConfig`] if the environment
/// supplies a non-blank `http_proxy` that is not a usable URI.
pub fn resolve_for_request(
    setting: &ProxySetting,
    target_host: Option<&str>,
    env: &EnvSnapshot,
) -> Result<Option<ProxyDescriptor>, ConnectionError> {
    match setting {
        ProxySetting::Manual(proxy) => Ok(Some(proxy.clone())),
        ProxySetting::Disabled => Ok(None),
        ProxySetting::FromEnvironment => {
            let Some(raw) = env.http_proxy() else {
                return Ok(None);
            };

            if let Some(host) = target_host
                && env.no_proxy().matches(host)
            {
                tracing::debug!(
                    target: "modkit_connection::proxy",
                    host,
                    "host excluded by no_proxy; connecting directly"
                );
                return Ok(None);
            }

            let proxy = ProxyDescriptor::parse(raw)?;
            tracing::debug!(
                target: "modkit_connection::proxy",
                host = target_host.unwrap_or_default(),
                proxy = proxy.uri().as_str(),
                "using proxy from environment"
            );
            Ok(Some(proxy))
        }
    }
}
