//! Client credential resolution and loading.
//!
//! # Design
//! Resolution is a pure function of the explicit arguments, an environment
//! snapshot and a [`ProxyProbe`]; it never reads certificate files. Loading
//! the chosen source into a [`ClientIdentity`] is a separate step so
//! precedence can be tested without touching the filesystem.
//!
//! Precedence: the key and cert slots each take the explicit argument over
//! `X509_USER_KEY` / `X509_USER_CERT`. The proxy slot starts from
//! `X509_USER_PROXY` and is replaced by the per-user default file whenever
//! that file exists. A filled proxy slot beats a key/cert pair.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ureq::tls::{parse_pem, Certificate, PemItem, PrivateKey};

use crate::error::CredentialError;

pub const PROXY_ENV: &str = "X509_USER_PROXY";
pub const KEY_ENV: &str = "X509_USER_KEY";
pub const CERT_ENV: &str = "X509_USER_CERT";

/// Which client certificate material to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    None,
    ProxyFile(PathBuf),
    KeyCertPair { key: PathBuf, cert: Option<PathBuf> },
}

/// `--key` / `--cert` as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ExplicitCredentials {
    pub key: Option<PathBuf>,
    pub cert: Option<PathBuf>,
}

/// Snapshot of the credential environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialEnv {
    pub proxy: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub cert: Option<PathBuf>,
}

impl CredentialEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Build a snapshot from any variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            proxy: get(PROXY_ENV),
            key: get(KEY_ENV),
            cert: get(CERT_ENV),
        }
    }
}

/// Platform convention for a default per-user proxy file.
pub trait ProxyProbe {
    /// Path of the current user's default proxy file, if one exists.
    fn default_proxy(&self) -> Option<PathBuf>;
}

/// Checks `/tmp/x509up_u<uid>` on unix; reports nothing elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProxyProbe;

impl SystemProxyProbe {
    #[cfg(unix)]
    fn candidate() -> Option<PathBuf> {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        Some(PathBuf::from(format!("/tmp/x509up_u{uid}")))
    }

    #[cfg(not(unix))]
    fn candidate() -> Option<PathBuf> {
        None
    }
}

impl ProxyProbe for SystemProxyProbe {
    fn default_proxy(&self) -> Option<PathBuf> {
        Self::candidate().filter(|path| path.is_file())
    }
}

/// A probe with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct FixedProxyProbe(pub Option<PathBuf>);

impl ProxyProbe for FixedProxyProbe {
    fn default_proxy(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

pub fn resolve(
    explicit: &ExplicitCredentials,
    env: &CredentialEnv,
    probe: &dyn ProxyProbe,
) -> CredentialSource {
    let key = explicit.key.clone().or_else(|| env.key.clone());
    let cert = explicit.cert.clone().or_else(|| env.cert.clone());
    let proxy = probe.default_proxy().or_else(|| env.proxy.clone());

    match (proxy, key) {
        (Some(proxy), _) => CredentialSource::ProxyFile(proxy),
        (None, Some(key)) => CredentialSource::KeyCertPair { key, cert },
        (None, None) => CredentialSource::None,
    }
}

/// A client certificate chain (leaf first) with its private key.
pub struct ClientIdentity {
    pub chain: Vec<Certificate<'static>>,
    pub key: PrivateKey<'static>,
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("chain_len", &self.chain.len())
            .finish_non_exhaustive()
    }
}

impl CredentialSource {
    /// Load the material this source points at. `None` loads nothing.
    pub fn load(&self) -> Result<Option<ClientIdentity>, CredentialError> {
        match self {
            CredentialSource::None => Ok(None),
            CredentialSource::ProxyFile(path) => load_proxy(path).map(Some),
            CredentialSource::KeyCertPair { key, cert } => {
                let cert = cert.as_deref().ok_or_else(|| CredentialError::KeyPair {
                    reason: format!("no certificate given for key {}", key.display()),
                })?;
                load_key_pair(key, cert).map(Some)
            }
        }
    }
}

/// Parse a grid proxy: every certificate block in file order, plus the first key.
pub fn load_proxy(path: &Path) -> Result<ClientIdentity, CredentialError> {
    let proxy_err = |reason: String| CredentialError::Proxy {
        path: path.to_path_buf(),
        reason,
    };
    let pem = fs::read(path).map_err(|e| proxy_err(e.to_string()))?;
    let (chain, key) = split_pem(&pem).map_err(proxy_err)?;
    if chain.is_empty() {
        return Err(proxy_err("no certificate found".to_string()));
    }
    let key = key.ok_or_else(|| proxy_err("no private key found".to_string()))?;
    debug!("loaded X509 proxy {} with {} certificate(s)", path.display(), chain.len());
    Ok(ClientIdentity { chain, key })
}

pub fn load_key_pair(key: &Path, cert: &Path) -> Result<ClientIdentity, CredentialError> {
    let pair_err = |path: &Path, reason: String| CredentialError::KeyPair {
        reason: format!("{}: {reason}", path.display()),
    };

    let cert_pem = fs::read(cert).map_err(|e| pair_err(cert, e.to_string()))?;
    let (chain, _) = split_pem(&cert_pem).map_err(|r| pair_err(cert, r))?;
    if chain.is_empty() {
        return Err(pair_err(cert, "no certificate found".to_string()));
    }

    let key_pem = fs::read(key).map_err(|e| pair_err(key, e.to_string()))?;
    let (_, key_item) = split_pem(&key_pem).map_err(|r| pair_err(key, r))?;
    let key_item = key_item.ok_or_else(|| pair_err(key, "no private key found".to_string()))?;

    debug!("loaded X509 key pair {} / {}", cert.display(), key.display());
    Ok(ClientIdentity {
        chain,
        key: key_item,
    })
}

/// Read every PEM certificate from a bundle.
pub fn parse_certificates(pem: &[u8]) -> Result<Vec<Certificate<'static>>, String> {
    split_pem(pem).map(|(certs, _)| certs)
}

fn split_pem(pem: &[u8]) -> Result<(Vec<Certificate<'static>>, Option<PrivateKey<'static>>), String> {
    let mut certs = Vec::new();
    let mut key = None;
    for item in parse_pem(pem) {
        match item.map_err(|e| e.to_string())? {
            PemItem::Certificate(cert) => certs.push(cert.to_owned()),
            PemItem::PrivateKey(k) if key.is_none() => key = Some(k.to_owned()),
            _ => {}
        }
    }
    Ok((certs, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(proxy: Option<&str>, key: Option<&str>, cert: Option<&str>) -> CredentialEnv {
        CredentialEnv {
            proxy: proxy.map(PathBuf::from),
            key: key.map(PathBuf::from),
            cert: cert.map(PathBuf::from),
        }
    }

    fn no_probe() -> FixedProxyProbe {
        FixedProxyProbe(None)
    }

    #[test]
    fn nothing_available_resolves_to_none() {
        let source = resolve(&ExplicitCredentials::default(), &CredentialEnv::default(), &no_probe());
        assert_eq!(source, CredentialSource::None);
    }

    #[test]
    fn default_proxy_file_is_used_when_nothing_else_is_set() {
        let probe = FixedProxyProbe(Some(PathBuf::from("/tmp/x509up_u1000")));
        let source = resolve(&ExplicitCredentials::default(), &CredentialEnv::default(), &probe);
        assert_eq!(source, CredentialSource::ProxyFile("/tmp/x509up_u1000".into()));
    }

    #[test]
    fn default_proxy_file_overrides_proxy_env() {
        let probe = FixedProxyProbe(Some(PathBuf::from("/tmp/x509up_u1000")));
        let source = resolve(&ExplicitCredentials::default(), &env(Some("/env/proxy"), None, None), &probe);
        assert_eq!(source, CredentialSource::ProxyFile("/tmp/x509up_u1000".into()));
    }

    #[test]
    fn proxy_env_is_used_without_default_proxy_file() {
        let source = resolve(&ExplicitCredentials::default(), &env(Some("/env/proxy"), None, None), &no_probe());
        assert_eq!(source, CredentialSource::ProxyFile("/env/proxy".into()));
    }

    #[test]
    fn proxy_beats_key_cert_pair() {
        let explicit = ExplicitCredentials {
            key: Some("/explicit/key.pem".into()),
            cert: Some("/explicit/cert.pem".into()),
        };
        let probe = FixedProxyProbe(Some(PathBuf::from("/tmp/x509up_u1000")));
        let source = resolve(&explicit, &env(None, Some("/env/key"), Some("/env/cert")), &probe);
        assert_eq!(source, CredentialSource::ProxyFile("/tmp/x509up_u1000".into()));
    }

    #[test]
    fn explicit_key_and_cert_override_env_independently() {
        let explicit = ExplicitCredentials {
            key: Some("/explicit/key.pem".into()),
            cert: None,
        };
        let source = resolve(&explicit, &env(None, Some("/env/key"), Some("/env/cert")), &no_probe());
        assert_eq!(
            source,
            CredentialSource::KeyCertPair {
                key: "/explicit/key.pem".into(),
                cert: Some("/env/cert".into()),
            }
        );
    }

    #[test]
    fn cert_alone_does_not_select_a_pair() {
        let explicit = ExplicitCredentials {
            key: None,
            cert: Some("/explicit/cert.pem".into()),
        };
        let source = resolve(&explicit, &CredentialEnv::default(), &no_probe());
        assert_eq!(source, CredentialSource::None);
    }

    #[test]
    fn empty_env_values_count_as_unset() {
        let env = CredentialEnv::from_lookup(|name| match name {
            PROXY_ENV => Some(String::new()),
            KEY_ENV => Some("/env/key".to_string()),
            _ => None,
        });
        assert_eq!(env.proxy, None);
        assert_eq!(env.key, Some(PathBuf::from("/env/key")));
        assert_eq!(env.cert, None);
    }

    #[test]
    fn key_without_cert_fails_as_key_pair_error() {
        let source = CredentialSource::KeyCertPair {
            key: "/explicit/key.pem".into(),
            cert: None,
        };
        assert!(matches!(source.load(), Err(CredentialError::KeyPair { .. })));
    }

    #[test]
    fn missing_proxy_file_fails_as_proxy_error() {
        let source = CredentialSource::ProxyFile("/nonexistent/x509up_u0".into());
        assert!(matches!(source.load(), Err(CredentialError::Proxy { .. })));
    }

    #[test]
    fn garbage_pem_has_no_certificates() {
        let certs = parse_certificates(b"not a pem file").unwrap_or_default();
        assert!(certs.is_empty());
    }
}
