//! TLS trust configuration assembled from resolved credentials.
//!
//! # Design
//! A custom root-CA bundle is honoured whether or not a client identity is
//! present, and server verification is only disabled by an explicit
//! `insecure` request. Presenting a client certificate has no effect on
//! how the server is verified.

use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};
use ureq::tls::Certificate;

use crate::credentials::{self, ClientIdentity, CredentialSource};
use crate::error::CredentialError;

#[derive(Default)]
pub struct TrustConfig {
    pub identity: Option<ClientIdentity>,
    /// Dedicated pool used only to verify the server.
    pub root_cas: Option<Vec<Certificate<'static>>>,
    pub skip_verify: bool,
}

impl fmt::Debug for TrustConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustConfig")
            .field("identity", &self.identity)
            .field("root_cas", &self.root_cas.as_ref().map(Vec::len))
            .field("skip_verify", &self.skip_verify)
            .finish()
    }
}

impl TrustConfig {
    pub fn build(
        source: &CredentialSource,
        root_ca: Option<&Path>,
        insecure: bool,
    ) -> Result<Self, CredentialError> {
        let identity = source.load()?;
        if let Some(identity) = &identity {
            info!("presenting client certificate chain of {} certificate(s)", identity.chain.len());
        }
        let root_cas = root_ca.map(load_root_cas).transpose()?;
        if insecure {
            warn!("server certificate verification is disabled");
        }
        Ok(Self {
            identity,
            root_cas,
            skip_verify: insecure,
        })
    }

    /// True when the transport can use its stock TLS behaviour.
    pub fn is_default(&self) -> bool {
        self.identity.is_none() && self.root_cas.is_none() && !self.skip_verify
    }
}

fn load_root_cas(path: &Path) -> Result<Vec<Certificate<'static>>, CredentialError> {
    let root_err = |reason: String| CredentialError::RootCa {
        path: path.to_path_buf(),
        reason,
    };
    let pem = fs::read(path).map_err(|e| root_err(e.to_string()))?;
    let certs = credentials::parse_certificates(&pem).map_err(root_err)?;
    if certs.is_empty() {
        return Err(root_err("no certificates found".to_string()));
    }
    Ok(certs)
}
