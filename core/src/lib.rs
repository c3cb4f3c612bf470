//! Core of the gridcurl HTTP request tool.
//!
//! # Overview
//! One invocation performs exactly one request:
//!
//! 1. [`credentials::resolve`] picks the client certificate source from
//!    explicit arguments, the environment and the per-user proxy file.
//! 2. [`TrustConfig::build`] loads that material plus an optional root-CA
//!    bundle.
//! 3. [`Transport::new`] turns the trust configuration and a timeout into a
//!    configured blocking client.
//! 4. [`build_request`] assembles the request without touching the network.
//! 5. [`execute`] sends it and writes the body to a file or stdout.
//!
//! # Design
//! - Every step returns a typed [`Error`]; only the binary maps it to an
//!   exit code.
//! - HTTP 4xx/5xx responses are data, not errors.

pub mod credentials;
pub mod error;
pub mod execute;
pub mod http;
pub mod multipart;
pub mod request;
pub mod transport;
pub mod trust;
pub mod types;

pub use credentials::{CredentialEnv, CredentialSource, ExplicitCredentials, ProxyProbe, SystemProxyProbe};
pub use error::{BuildError, CredentialError, Error, TransportError, TransportErrorKind};
pub use execute::{execute, ExecOptions};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{build_request, resolve_body_source};
pub use transport::{Transport, TransportProfile};
pub use trust::TrustConfig;
pub use types::{parse_form_field, parse_header, FormFields, Headers, RequestSpec};
