//! Request URL resolution
//!
//! A connection carries a [`UrlPrefix`] (scheme, host, port and base path).
//! Each request supplies an optional [`RequestTarget`] which is either an
//! absolute URL that replaces the prefix entirely, or a relative reference
//! joined onto the prefix path as if that path ended in `/`.

use crate::error::{ConnectionError, InvalidUrlKind};
use crate::params::{Params, ParamsEncoder};
use std::fmt;
use std::net::Ipv6Addr;
use url::{Host, Url};

const DEFAULT_SCHEME: &str = "http";

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        _ => None,
    }
}

pub(crate) fn percent_decode(s: &str) -> String {
    match urlencoding::decode(s) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => s.to_owned(),
    }
}

/// Base address shared by every request on a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPrefix {
    scheme: String,
    host: Option<String>,
    port: Option<u16>,
    /// Base path as given (leading `/` guaranteed, trailing `/` preserved)
    path: String,
}

impl Default for UrlPrefix {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_owned(),
            host: None,
            port: None,
            path: "/".to_owned(),
        }
    }
}

/// A parsed prefix together with the parts a connection lifts out of it.
pub(crate) struct ParsedPrefix {
    pub(crate) prefix: UrlPrefix,
    pub(crate) query: Option<String>,
    /// Percent-decoded `user:password` userinfo
    pub(crate) credentials: Option<(String, String)>,
}

impl UrlPrefix {
    /// Parse an absolute base URL.
    ///
    /// The query string and userinfo are discarded; use
    /// [`Connection::set_url_prefix`](crate::Connection::set_url_prefix)
    /// to lift them into connection params and an `Authorization` header.
    ///
    /// # Errors
    /// Returns [`ConnectionError::InvalidUrl`] if the URL cannot be parsed or
    /// has no host.
    pub fn parse(input: &str) -> Result<Self, ConnectionError> {
        Ok(Self::parse_parts(input)?.prefix)
    }

    pub(crate) fn parse_parts(input: &str) -> Result<ParsedPrefix, ConnectionError> {
        let url = Url::parse(input).map_err(|e| {
            let kind = match e {
                url::ParseError::RelativeUrlWithoutBase => InvalidUrlKind::MissingScheme,
                _ => InvalidUrlKind::ParseError,
            };
            ConnectionError::invalid_url(input, kind, e.to_string())
        })?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| {
                ConnectionError::invalid_url(input, InvalidUrlKind::MissingHost, "missing host")
            })?
            .to_owned();

        let credentials = if url.username().is_empty() && url.password().is_none() {
            None
        } else {
            Some((
                percent_decode(url.username()),
                percent_decode(url.password().unwrap_or_default()),
            ))
        };

        Ok(ParsedPrefix {
            prefix: Self {
                scheme: url.scheme().to_owned(),
                host: Some(host),
                port: url.port(),
                path: url.path().to_owned(),
            },
            query: url.query().map(str::to_owned),
            credentials,
        })
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Explicit port, or the well-known default for the scheme
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| default_port(&self.scheme))
    }

    /// Base path normalised to start with `/` and never end with `/`
    /// unless it is exactly `/`
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }

    /// Base path exactly as configured
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// # Errors
    /// Returns [`ConnectionError::InvalidArgument`] if `scheme` is not a valid
    /// URL scheme.
    pub fn set_scheme(&mut self, scheme: &str) -> Result<(), ConnectionError> {
        let valid = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid {
            return Err(ConnectionError::InvalidArgument(format!(
                "invalid URL scheme '{scheme}'"
            )));
        }
        self.scheme = scheme.to_ascii_lowercase();
        Ok(())
    }

    /// Set the host; IPv6 literals may be given with or without brackets.
    ///
    /// # Errors
    /// Returns [`ConnectionError::InvalidArgument`] if `host` is not a valid
    /// domain or IP literal (a `:port` suffix is rejected; use
    /// [`set_port`](Self::set_port)).
    pub fn set_host(&mut self, host: Option<&str>) -> Result<(), ConnectionError> {
        let Some(raw) = host else {
            self.host = None;
            return Ok(());
        };
        let invalid = |reason: String| {
            ConnectionError::InvalidArgument(format!("invalid host '{raw}': {reason}"))
        };
        if raw.trim().is_empty() {
            return Err(invalid("host is blank".to_owned()));
        }

        let parsed = match raw.parse::<Ipv6Addr>() {
            Ok(ip) => Host::Ipv6(ip),
            Err(_) => Host::parse(raw).map_err(|e| invalid(e.to_string()))?,
        };
        self.host = Some(parsed.to_string());
        Ok(())
    }

    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    /// Set the base path; a missing leading `/` is added and `None` resets to `/`
    ///
    /// # Errors
    /// Returns [`ConnectionError::InvalidArgument`] if `path` contains a query
    /// (`?`) or fragment (`#`) delimiter.
    pub fn set_path_prefix(&mut self, path: Option<&str>) -> Result<(), ConnectionError> {
        if let Some(p) = path
            && p.contains(['?', '#'])
        {
            return Err(ConnectionError::InvalidArgument(format!(
                "invalid path prefix '{p}': query and fragment delimiters are not allowed"
            )));
        }
        self.path = match path {
            None | Some("") => "/".to_owned(),
            Some(p) if p.starts_with('/') => p.to_owned(),
            Some(p) => format!("/{p}"),
        };
        Ok(())
    }

    fn authority(&self, host: &str) -> String {
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_owned()
        };
        match self.port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        }
    }

    /// Absolute URL for this prefix, with `path` as the path
    fn to_url(&self, path: &str) -> Result<Url, ConnectionError> {
        let host = self.host.as_deref().ok_or_else(|| {
            ConnectionError::invalid_url(
                path,
                InvalidUrlKind::MissingHost,
                "connection has no host and the request URL is not absolute",
            )
        })?;
        let raw = format!("{}://{}{}", self.scheme, self.authority(host), path);
        Url::parse(&raw)
            .map_err(|e| ConnectionError::invalid_url(raw, InvalidUrlKind::ParseError, e.to_string()))
    }
}

/// The path-or-URL argument of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestTarget {
    /// Relative reference joined onto the connection prefix
    Relative(String),
    /// Absolute URL; replaces scheme, host, port and path of the prefix
    Absolute(Url),
}

impl RequestTarget {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Relative(p) if p.is_empty())
    }
}

impl From<&str> for RequestTarget {
    fn from(value: &str) -> Self {
        match Url::parse(value) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Self::Absolute(url),
            _ => Self::Relative(value.to_owned()),
        }
    }
}

impl From<String> for RequestTarget {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&String> for RequestTarget {
    fn from(value: &String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<Url> for RequestTarget {
    fn from(value: Url) -> Self {
        if value.host_str().is_some_and(|h| !h.is_empty()) {
            Self::Absolute(value)
        } else {
            Self::Relative(value.into())
        }
    }
}

impl From<&Url> for RequestTarget {
    fn from(value: &Url) -> Self {
        Self::from(value.clone())
    }
}

/// Fully resolved, absolute request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrl(Url);

impl RequestUrl {
    #[must_use]
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Explicit port, or the well-known default for the scheme
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    #[must_use]
    pub fn into_url(self) -> Url {
        self.0
    }
}

impl fmt::Display for RequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

fn set_query(url: &mut Url, query: &str) {
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(query));
    }
}

/// Resolve `target` against `prefix` without touching connection params.
///
/// When `params` is `Some`, the resulting query is exactly `params` (an empty
/// mapping clears it). When `None`, whatever query the target carries is kept.
///
/// # Errors
/// Returns [`ConnectionError::InvalidUrl`] if no host can be determined or the
/// joined URL cannot be parsed.
pub fn resolve_exclusive(
    prefix: &UrlPrefix,
    target: Option<&RequestTarget>,
    params: Option<&Params>,
    encoder: &dyn ParamsEncoder,
) -> Result<RequestUrl, ConnectionError> {
    let mut url = match target {
        Some(RequestTarget::Absolute(url)) => url.clone(),
        Some(RequestTarget::Relative(path)) if !path.is_empty() => {
            let base = if prefix.path.ends_with('/') {
                prefix.to_url(&prefix.path)?
            } else {
                prefix.to_url(&format!("{}/", prefix.path))?
            };
            base.join(path).map_err(|e| {
                ConnectionError::invalid_url(path.as_str(), InvalidUrlKind::ParseError, e.to_string())
            })?
        }
        _ => prefix.to_url(&prefix.path)?,
    };

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConnectionError::invalid_url(
            url.as_str(),
            InvalidUrlKind::MissingHost,
            "resolved URL has no host",
        ));
    }

    match params {
        Some(params) => set_query(&mut url, &encoder.encode(params)),
        None => {
            if url.query() == Some("") {
                url.set_query(None);
            }
        }
    }

    tracing::trace!(url = %url, "resolved exclusive request URL");
    Ok(RequestUrl(url))
}

/// Resolve `target` against `prefix`, building the query from `base_params`
/// overlaid by the target's own query, overlaid by `params`.
///
/// # Errors
/// Same as [`resolve_exclusive`].
pub fn resolve(
    prefix: &UrlPrefix,
    base_params: &Params,
    target: Option<&RequestTarget>,
    params: Option<&Params>,
    encoder: &dyn ParamsEncoder,
) -> Result<RequestUrl, ConnectionError> {
    let RequestUrl(mut url) = resolve_exclusive(prefix, target, None, encoder)?;

    let mut query = base_params.clone();
    if let Some(own) = url.query() {
        query.merge(&encoder.decode(own));
    }
    if let Some(params) = params {
        query.merge(params);
    }
    set_query(&mut url, &encoder.encode(&query));

    tracing::trace!(url = %url, "resolved request URL");
    Ok(RequestUrl(url))
}
