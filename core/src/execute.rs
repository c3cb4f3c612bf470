//! Send a built request and deliver the response body.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use log::info;

use crate::error::Error;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::RequestSpec;

#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub output: Option<PathBuf>,
    pub verbosity: u8,
}

impl From<&RequestSpec> for ExecOptions {
    fn from(spec: &RequestSpec) -> Self {
        Self {
            output: spec.output.clone(),
            verbosity: spec.verbosity,
        }
    }
}

/// Perform the round trip and write the body to `options.output` or `stdout`.
///
/// The HTTP status is never treated as a failure; the response is returned
/// so callers can inspect it.
pub fn execute(
    transport: &Transport,
    req: &HttpRequest,
    options: &ExecOptions,
    stdout: &mut impl Write,
) -> Result<HttpResponse, Error> {
    if options.verbosity > 1 {
        info!("http request {} {}\n{}", req.method, req.url, req.dump());
    }

    let response = transport.send(req)?;

    if options.verbosity > 1 {
        info!("http response url {}\n{}", req.url, response.dump());
    }

    write_body(&response.body, options, stdout)?;
    Ok(response)
}

pub fn write_body(body: &[u8], options: &ExecOptions, stdout: &mut impl Write) -> Result<(), Error> {
    match &options.output {
        Some(path) => fs::write(path, body)
            .map_err(|e| Error::io(format!("Unable to write, file: {}", path.display()), e)),
        None => {
            let write_err = |e| Error::io("Unable to write to stdout", e);
            stdout.write_all(body).map_err(write_err)?;
            stdout.write_all(b"\n").map_err(write_err)?;
            stdout.flush().map_err(write_err)
        }
    }
}
