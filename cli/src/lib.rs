//! Command-line surface of gridcurl.
//!
//! Parses flags into a [`RequestSpec`], resolves credentials from the real
//! environment and hands everything to `gridcurl-core`.

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, LevelFilter};

use gridcurl_core::credentials::{self, CredentialEnv, ExplicitCredentials, SystemProxyProbe};
use gridcurl_core::{
    build_request, execute, parse_form_field, parse_header, Error, ExecOptions, FormFields, Headers,
    HttpMethod, RequestSpec, Transport, TrustConfig,
};

/// Perform one HTTP request, optionally with X509 client credentials.
///
/// Client credentials are taken from --key/--cert, X509_USER_KEY/X509_USER_CERT,
/// the default proxy file /tmp/x509up_u<uid> or X509_USER_PROXY (the default
/// file wins when it exists). A proxy, when present, is preferred over a
/// key/cert pair.
#[derive(Parser, Debug, Clone)]
#[command(name = "gridcurl", version)]
pub struct Cli {
    /// Input url.
    #[arg(long, short = 'u')]
    pub url: String,

    /// HTTP method: GET, POST, PUT or DELETE.
    #[arg(long, short = 'm', default_value = "GET")]
    pub method: String,

    /// Input data, or @file to read it from a file.
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// HTTP header, e.g. Content-Type:application/json. Repeatable.
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// HTTP form key-value pair, e.g. key=value or file=@/path. Repeatable.
    #[arg(long = "form", short = 'f', value_name = "NAME=VALUE")]
    pub forms: Vec<String>,

    /// X509 key file name.
    #[arg(long, short = 'k')]
    pub key: Option<PathBuf>,

    /// X509 cert file name.
    #[arg(long, short = 'c')]
    pub cert: Option<PathBuf>,

    /// Root CA bundle used to verify the server.
    #[arg(long = "rootCA", alias = "root-ca", value_name = "FILE")]
    pub root_ca: Option<PathBuf>,

    /// Skip verification of the server certificate.
    #[arg(long, default_value_t = false)]
    pub insecure: bool,

    /// Output file name; the body goes to stdout when omitted.
    #[arg(long = "out", short = 'o')]
    pub output: Option<PathBuf>,

    /// HTTP timeout in seconds, 0 for none.
    #[arg(long, short = 't', default_value_t = 0)]
    pub timeout: u64,

    /// Verbosity level.
    #[arg(long, short = 'v', default_value_t = 0)]
    pub verbose: u8,
}

impl Cli {
    pub fn request_spec(&self) -> Result<RequestSpec, Error> {
        if self.url.trim().is_empty() {
            return Err(Error::Input("no input url".to_string()));
        }
        let method: HttpMethod = self.method.parse()?;

        let headers = self
            .headers
            .iter()
            .map(|h| parse_header(h))
            .collect::<Result<Headers, _>>()?;
        let form = self
            .forms
            .iter()
            .map(|f| parse_form_field(f))
            .collect::<Result<FormFields, _>>()?;

        if self.verbose > 0 {
            info!("HTTP headers");
            for (k, v) in headers.iter() {
                info!("{k} {v}");
            }
            info!("HTTP form pairs");
            for (k, v) in form.iter() {
                info!("{k} {v}");
            }
        }

        Ok(RequestSpec {
            url: self.url.clone(),
            method,
            data: self.data.clone(),
            headers,
            form,
            output: self.output.clone(),
            timeout_secs: self.timeout,
            verbosity: self.verbose,
        })
    }

    pub fn explicit_credentials(&self) -> ExplicitCredentials {
        ExplicitCredentials {
            key: self.key.clone(),
            cert: self.cert.clone(),
        }
    }
}

/// Log filter for a verbosity level; `RUST_LOG` still overrides it.
pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 | 2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init_logging(verbose: u8) {
    env_logger::Builder::new()
        .filter_level(log_level(verbose))
        .parse_default_env()
        .init();
}

pub fn run(cli: &Cli, stdout: &mut impl Write) -> Result<(), Error> {
    let spec = cli.request_spec()?;

    let source = credentials::resolve(
        &cli.explicit_credentials(),
        &CredentialEnv::from_env(),
        &SystemProxyProbe,
    );
    debug!("credential source: {source:?}");
    let trust = TrustConfig::build(&source, cli.root_ca.as_deref(), cli.insecure)?;
    let transport = Transport::new(trust, spec.timeout_secs);

    let req = build_request(&spec)?;
    execute(&transport, &req, &ExecOptions::from(&spec), stdout)?;
    Ok(())
}
