//! Blocking HTTP transport backed by a `ureq::Agent`.
//!
//! # Design
//! `TransportProfile` is the pure decision of how much to customise the
//! agent, so it can be checked without building one. In every profile 4xx
//! and 5xx responses come back as data rather than errors.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use ureq::tls::{ClientCert, RootCerts, TlsConfig};
use ureq::Agent;

use crate::error::{BuildError, Error, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::trust::TrustConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportProfile {
    /// Stock agent configuration.
    Default,
    TimeoutOnly(Duration),
    Tls { timeout: Option<Duration> },
}

impl TransportProfile {
    pub fn new(trust: &TrustConfig, timeout_secs: u64) -> Self {
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));
        match (trust.is_default(), timeout) {
            (true, None) => TransportProfile::Default,
            (true, Some(timeout)) => TransportProfile::TimeoutOnly(timeout),
            (false, timeout) => TransportProfile::Tls { timeout },
        }
    }
}

/// A configured client that performs one round trip per `send`.
pub struct Transport {
    agent: Agent,
    profile: TransportProfile,
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport").field("profile", &self.profile).finish()
    }
}

impl Transport {
    pub fn new(trust: TrustConfig, timeout_secs: u64) -> Self {
        let profile = TransportProfile::new(&trust, timeout_secs);
        debug!("transport profile: {profile:?}");

        let mut config = Agent::config_builder().http_status_as_error(false);
        match profile {
            TransportProfile::Default => {}
            TransportProfile::TimeoutOnly(timeout) => {
                config = config.timeout_global(Some(timeout));
            }
            TransportProfile::Tls { timeout } => {
                config = config.tls_config(tls_config(trust)).timeout_global(timeout);
            }
        }

        Self {
            agent: config.build().new_agent(),
            profile,
        }
    }

    pub fn profile(&self) -> TransportProfile {
        self.profile
    }

    pub fn send(&self, req: &HttpRequest) -> Result<HttpResponse, Error> {
        let mut builder = ureq::http::Request::builder()
            .method(req.method.as_str())
            .uri(req.url.as_str());
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let invalid = |e: ureq::http::Error| BuildError::Invalid(e.to_string());
        let result = match &req.body {
            Some(body) => self.agent.run(builder.body(body.as_slice()).map_err(invalid)?),
            None => self.agent.run(builder.body(()).map_err(invalid)?),
        };
        let mut response = result.map_err(TransportError::from)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(TransportError::from)?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn tls_config(trust: TrustConfig) -> TlsConfig {
    let mut builder = TlsConfig::builder().disable_verification(trust.skip_verify);
    if let Some(identity) = trust.identity {
        builder = builder.client_cert(Some(ClientCert::new_with_certs(&identity.chain, identity.key)));
    }
    if let Some(root_cas) = trust.root_cas {
        builder = builder.root_certs(RootCerts::Specific(Arc::new(root_cas)));
    }
    builder.build()
}
