//! `multipart/form-data` bodies for POST forms.
//!
//! Parts are assembled with the lazy client of the [`multipart`] crate and
//! read fully into memory. A value of `@path` becomes a file part whose
//! filename is the last `/` segment of the path.

use std::borrow::Cow;
use std::fs::File;
use std::io::Read;

use log::debug;
use multipart::client::lazy::Multipart;

use crate::error::Error;
use crate::types::INDIRECTION_MARKER;

/// An encoded form and the `Content-Type` header that describes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormBody {
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Encode `fields` in the order given.
///
/// Files are opened up front so a missing one fails before anything is
/// read; their contents are pulled in when the body is assembled.
pub fn encode_form(fields: &[(&str, &str)], verbosity: u8) -> Result<FormBody, Error> {
    let mut form = Multipart::new();
    for &(name, value) in fields {
        match value.strip_prefix(INDIRECTION_MARKER) {
            Some(path) => {
                let file = File::open(path).map_err(|e| Error::io(format!("open form file {path}"), e))?;
                if verbosity > 2 {
                    let len = file.metadata().map(|m| m.len()).unwrap_or_default();
                    debug!("read {len} bytes from {path}");
                }
                form.add_stream(
                    name,
                    file,
                    Some(upload_name(path)),
                    Some(mime::APPLICATION_OCTET_STREAM),
                );
            }
            None => {
                if verbosity > 2 {
                    debug!("read {} bytes from {name}={value}", value.len());
                }
                form.add_text(name, value);
            }
        }
    }

    let mut prepared = form
        .prepare()
        .map_err(|e| Error::io("prepare multipart form", e.error))?;
    let content_type = format!("multipart/form-data; boundary={}", prepared.boundary());
    let mut body = Vec::new();
    prepared
        .read_to_end(&mut body)
        .map_err(|e| Error::io("read multipart form", e))?;
    Ok(FormBody { content_type, body })
}

fn upload_name(path: &str) -> Cow<'_, str> {
    Cow::Borrowed(path.rsplit('/').next().unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn boundary(form: &FormBody) -> &str {
        form.content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap()
    }

    #[test]
    fn text_and_file_parts_share_one_boundary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();
        let path = format!("@{}", file.path().display());
        let filename = file.path().file_name().unwrap().to_string_lossy().into_owned();

        let form = encode_form(&[("name", "bob"), ("file", path.as_str())], 0).unwrap();
        let delimiter = format!("--{}", boundary(&form));
        let body = String::from_utf8(form.body.clone()).unwrap();

        assert_eq!(body.matches(&delimiter).count(), 3, "two parts and the close");
        assert!(body.trim_end().ends_with(&format!("{delimiter}--")));
        let text_at = body.find("name=\"name\"").unwrap();
        let file_at = body
            .find(&format!("name=\"file\"; filename=\"{filename}\""))
            .unwrap();
        assert!(text_at < file_at);
        assert!(body.contains("\r\n\r\nbob\r\n"));
        assert!(body.contains("Content-Type: application/octet-stream"));
        assert!(body.contains("\r\n\r\nhello\r\n"));
    }

    #[test]
    fn filename_is_last_path_segment() {
        assert_eq!(upload_name("/data/uploads/report.csv"), "report.csv");
        assert_eq!(upload_name("report.csv"), "report.csv");
    }

    #[test]
    fn every_form_gets_a_fresh_boundary() {
        let a = encode_form(&[("a", "1")], 0).unwrap();
        let b = encode_form(&[("a", "1")], 0).unwrap();
        assert_ne!(boundary(&a), boundary(&b));
    }

    #[test]
    fn missing_file_fails_before_encoding() {
        let err = encode_form(&[("name", "bob"), ("file", "@/nonexistent/upload.bin")], 0).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/upload.bin"));
    }
}
