//! Error taxonomy for a single gridcurl invocation.
//!
//! # Design
//! Every component returns a typed `Result`; nothing in the core exits the
//! process. The binary maps the top-level `Error` to a message and an exit
//! code via [`Error::exit_code`]. HTTP 4xx/5xx responses are data, not
//! errors, so no variant carries a status code.

use std::io;
use std::path::PathBuf;

/// Top-level error returned by every core operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed `name:value` header or `name=value` form argument.
    #[error("invalid input: {0}")]
    Input(String),

    /// Unreadable or unparseable proxy, key, cert or root-CA material.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The request could not be assembled.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Connection, TLS handshake or timeout failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reading an indirected input file or writing the output file failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error kind. Success is always 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            Error::Input(_) => 2,
            Error::Credential(_) => 3,
            Error::Build(_) => 4,
            Error::Transport(_) => 5,
            Error::Io { .. } => 6,
        }
    }
}

/// Failures while loading TLS material.
///
/// Proxy parse failures and key-pair failures are separate variants so the
/// caller can tell which credential source was at fault.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to parse X509 proxy {}: {reason}", path.display())]
    Proxy { path: PathBuf, reason: String },

    #[error("failed to parse user X509 certificate: {reason}")]
    KeyPair { reason: String },

    #[error("failed to load root CA bundle {}: {reason}", path.display())]
    RootCa { path: PathBuf, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("HTTP method not implemented: {0}")]
    UnsupportedMethod(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Coarse classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Tls,
    Connect,
    Other,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        let kind = match &err {
            ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
            ureq::Error::Tls(_) | ureq::Error::Rustls(_) => TransportErrorKind::Tls,
            ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
            ureq::Error::Io(io) if wraps_tls_error(io) => TransportErrorKind::Tls,
            ureq::Error::Io(io) if io.kind() == io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
            ureq::Error::Io(io) if io.kind() == io::ErrorKind::ConnectionRefused => {
                TransportErrorKind::Connect
            }
            _ => TransportErrorKind::Other,
        };
        let message = match kind {
            TransportErrorKind::Timeout => format!("request timed out: {err}"),
            _ => format!("request failed: {err}"),
        };
        TransportError { kind, message }
    }
}

/// Handshake failures surface from the TLS stream as I/O errors.
fn wraps_tls_error(err: &io::Error) -> bool {
    err.get_ref().is_some_and(|inner| inner.is::<rustls::Error>())
}
