use crate::error::ConnectionError;
use crate::proxy::ProxyDescriptor;
use crate::resolver::RequestUrl;
use bytes::Bytes;
use http::{HeaderMap, Method};
use tower::util::BoxCloneSyncService;

/// Response produced by the execution pipeline
pub type PipelineResponse = http::Response<Bytes>;

/// Type-erased execution pipeline (middleware and adapter stack).
///
/// The connection only shapes requests; sending them is delegated to this
/// service. Any `tower::Service<RequestDescriptor>` that is `Clone + Send +
/// Sync` can be used via [`ConnectionBuilder::pipeline`](crate::ConnectionBuilder::pipeline).
pub type Pipeline = BoxCloneSyncService<RequestDescriptor, PipelineResponse, ConnectionError>;

/// Fully resolved outbound request, handed to the execution pipeline.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: RequestUrl,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Proxy selected for this request, if any
    pub proxy: Option<ProxyDescriptor>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Convert into an `http::Request` for hyper/tower based transports.
    ///
    /// The selected proxy, if any, is stored in the request extensions as a
    /// [`ProxyDescriptor`].
    ///
    /// # Errors
    /// Returns [`ConnectionError::RequestBuild`] if the URL is not a valid
    /// `http::Uri`.
    pub fn into_http_request(self) -> Result<http::Request<Bytes>, ConnectionError> {
        let mut request = http::Request::builder()
            .method(self.method)
            .uri(self.url.as_str())
            .body(self.body)?;
        *request.headers_mut() = self.headers;
        if let Some(proxy) = self.proxy {
            request.extensions_mut().insert(proxy);
        }
        Ok(request)
    }
}
