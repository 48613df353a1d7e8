use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::ConnectionError;
use crate::params::{ParamValue, Params, ParamsEncoding};
use crate::proxy::{ProxyInput, ProxySetting};
use crate::request::{Pipeline, PipelineResponse, RequestDescriptor};
use http::header::USER_AGENT;
use tower::util::BoxCloneSyncService;

/// Builder for constructing a [`Connection`] with a fluent API
pub struct ConnectionBuilder {
    config: ConnectionConfig,
    pipeline: Option<Pipeline>,
    proxy_disabled: bool,
}

impl ConnectionBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ConnectionConfig::default(),
            pipeline: None,
            proxy_disabled: false,
        }
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: ConnectionConfig) -> Self {
        Self {
            config,
            pipeline: None,
            proxy_disabled: false,
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = Some(url.into());
        self
    }

    /// Replace the default params
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.config.params = params;
        self
    }

    /// Add a single default param
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.config.params.insert(key, value);
        self
    }

    /// Add a default header
    ///
    /// Header validation is deferred until [`build`](Self::build).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(name.into(), value.into());
        self
    }

    /// Use a manual proxy instead of the environment
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<ProxyInput>) -> Self {
        self.config.proxy = Some(proxy.into());
        self.proxy_disabled = false;
        self
    }

    /// Never use a proxy, ignoring `http_proxy`
    #[must_use]
    pub fn no_proxy(mut self) -> Self {
        self.config.proxy = None;
        self.proxy_disabled = true;
        self
    }

    /// Select the query string encoding
    #[must_use]
    pub fn params_encoder(mut self, encoding: ParamsEncoding) -> Self {
        self.config.params_encoder = encoding;
        self
    }

    /// Set the User-Agent header value
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the execution pipeline used by [`Connection::run_request`]
    #[must_use]
    pub fn pipeline<S>(mut self, service: S) -> Self
    where
        S: tower::Service<RequestDescriptor, Response = PipelineResponse, Error = ConnectionError>
            + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        self.pipeline = Some(BoxCloneSyncService::new(service));
        self
    }

    /// Build the connection
    ///
    /// # Errors
    /// Returns [`ConnectionError::InvalidUrl`] for a malformed base URL,
    /// [`ConnectionError::InvalidProxyConfig`] for an unusable manual proxy,
    /// or a header error for invalid default headers.
    pub fn build(self) -> Result<Connection, ConnectionError> {
        let Self {
            config,
            pipeline,
            proxy_disabled,
        } = self;

        let mut connection = Connection::empty(config.params_encoder, pipeline);

        if !config.user_agent.is_empty() {
            connection.set_header(USER_AGENT.as_str(), &config.user_agent)?;
        }

        if let Some(url) = config.url.as_deref() {
            connection.set_url_prefix(url)?;
        }

        connection.params.merge(&config.params);

        for (name, value) in &config.headers {
            connection.set_header(&name.replace('_', "-"), value)?;
        }

        connection.proxy = if proxy_disabled {
            ProxySetting::Disabled
        } else if let Some(proxy) = config.proxy {
            ProxySetting::manual(proxy)?
        } else {
            ProxySetting::FromEnvironment
        };

        tracing::debug!(
            target: "modkit_connection::builder",
            host = connection.host().unwrap_or_default(),
            path_prefix = connection.path_prefix(),
            params = connection.params.len(),
            manual_proxy = connection.proxy.is_manual(),
            "connection built"
        );

        Ok(connection)
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
