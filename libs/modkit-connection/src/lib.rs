#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP connection configuration for `ModKit`
//!
//! A [`Connection`] holds everything that is shared by the requests made
//! against one service and turns per-call arguments into a fully resolved
//! [`RequestDescriptor`]:
//! - Base URL (scheme, host, port, path prefix) and relative/absolute target
//!   resolution
//! - Default query params with pluggable encoding (nested `a[b]=c` or flat
//!   `a=1&a=2`)
//! - Default headers, including `Basic`/`Token` authorization helpers
//! - Proxy selection: a manual proxy, or `http_proxy`/`no_proxy` read from the
//!   environment on every request
//!
//! Sending requests is delegated to an external `tower` service (the
//! execution pipeline), so any transport can be plugged in.
//!
//! # Example
//!
//! ```ignore
//! use modkit_connection::{Connection, Params};
//!
//! let conn = Connection::builder()
//!     .url("http://sushi.com/nigiri?lang=en")
//!     .header("accept", "application/json")
//!     .build()?;
//!
//! let url = conn.build_url(Some("sake.html".into()), Some(&Params::new().with("q", "tuna")))?;
//! assert_eq!(url.as_str(), "http://sushi.com/nigiri/sake.html?lang=en&q=tuna");
//!
//! let response = conn.get("sake.html").await?;
//! ```

pub mod auth;
mod builder;
mod config;
mod connection;
mod error;
pub mod params;
pub mod proxy;
mod request;
pub mod resolver;

pub use builder::ConnectionBuilder;
pub use config::{ConnectionConfig, DEFAULT_USER_AGENT};
pub use connection::Connection;
pub use error::{ConnectionError, InvalidUrlKind};
pub use params::{ParamValue, Params, ParamsEncoder, ParamsEncoding};
pub use proxy::{EnvSnapshot, ProxyDescriptor, ProxyInput, ProxyOptions, ProxySetting};
pub use request::{Pipeline, PipelineResponse, RequestDescriptor};
pub use resolver::{RequestTarget, RequestUrl, UrlPrefix};
