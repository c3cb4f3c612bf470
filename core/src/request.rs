//! Request construction from a [`RequestSpec`].
//!
//! # Design
//! Building never touches the network. The body path is chosen once:
//! GET and DELETE carry nothing, POST and PUT send raw data when it is
//! given, POST falls back to a multipart form, and anything else sends an
//! empty body. Caller headers are appended after body-derived ones.

use std::path::Path;

use log::warn;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest};
use crate::multipart::{encode_form, FormBody};
use crate::types::{FormFields, RequestSpec, INDIRECTION_MARKER};

/// Form field that is always emitted last.
pub const FILE_FIELD: &str = "file";

pub fn build_request(spec: &RequestSpec) -> Result<HttpRequest, Error> {
    let mut headers = Vec::new();
    let body = if !spec.method.allows_body() {
        None
    } else if let Some(data) = spec.raw_data() {
        Some(resolve_body_source(data)?)
    } else if spec.method == HttpMethod::Post && !spec.form.is_empty() {
        let FormBody { content_type, body } = encode_form(&form_order(&spec.form), spec.verbosity)?;
        headers.push(("Content-Type".to_string(), content_type));
        Some(body)
    } else {
        if !spec.form.is_empty() {
            warn!("form fields are only sent with POST; sending {} with an empty body", spec.method);
        }
        Some(Vec::new())
    };

    headers.extend(spec.headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    Ok(HttpRequest {
        method: spec.method,
        url: spec.url.clone(),
        headers,
        body,
    })
}

/// Resolve `@path` to the file's contents when that file exists.
///
/// Any other value, including `@` followed by a missing path, is used
/// literally.
pub fn resolve_body_source(data: &str) -> Result<Vec<u8>, Error> {
    if let Some(path) = data.strip_prefix(INDIRECTION_MARKER) {
        let path = Path::new(path);
        if path.exists() {
            return std::fs::read(path)
                .map_err(|e| Error::io(format!("Unable to read data from file: {}", path.display()), e));
        }
    }
    Ok(data.as_bytes().to_vec())
}

/// Fields in emission order: as given, with the `file` field moved last.
pub fn form_order(form: &FormFields) -> Vec<(&str, &str)> {
    let (files, mut fields): (Vec<_>, Vec<_>) = form.iter().partition(|(name, _)| *name == FILE_FIELD);
    fields.extend(files);
    fields
}
