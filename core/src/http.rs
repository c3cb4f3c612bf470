//! HTTP request and response values as plain data.
//!
//! # Design
//! The request builder produces an `HttpRequest` without touching the
//! network, and the transport turns it into an `HttpResponse`. Keeping both
//! as owned data makes the builder deterministic and lets the verbose trace
//! render exactly what is sent.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::error::BuildError;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// GET and DELETE never carry a body.
    pub fn allows_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(BuildError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// A fully-built outgoing request.
///
/// `headers` holds body-derived headers first, then every caller-supplied
/// header. `body` is `None` only for methods that never carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// All values of header `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render the request as it would appear on the wire, for tracing.
    pub fn dump(&self) -> String {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method, self.url);
        for (name, value) in &self.headers {
            let _ = write!(out, "{name}: {value}\r\n");
        }
        if let Some(body) = &self.body {
            let _ = write!(out, "Content-Length: {}\r\n", body.len());
        }
        out.push_str("\r\n");
        if let Some(body) = &self.body {
            out.push_str(&String::from_utf8_lossy(body));
        }
        out
    }
}

/// A response read fully into memory.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn dump(&self) -> String {
        let mut out = format!("HTTP/1.1 {}\r\n", self.status);
        for (name, value) in &self.headers {
            let _ = write!(out, "{name}: {value}\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&String::from_utf8_lossy(&self.body));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Delete".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
        assert_eq!("PUT".parse::<HttpMethod>().unwrap(), HttpMethod::Put);
    }

    #[test]
    fn unknown_method_is_a_build_error() {
        let err = "PATCH".parse::<HttpMethod>().unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedMethod(ref m) if m == "PATCH"));
    }

    #[test]
    fn only_post_and_put_allow_a_body() {
        assert!(!HttpMethod::Get.allows_body());
        assert!(!HttpMethod::Delete.allows_body());
        assert!(HttpMethod::Post.allows_body());
        assert!(HttpMethod::Put.allows_body());
    }

    #[test]
    fn request_dump_includes_headers_and_body() {
        let req = HttpRequest {
            method: HttpMethod::Post,
            url: "http://example.test/api".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(br#"{"a":1}"#.to_vec()),
        };
        let dump = req.dump();
        assert!(dump.starts_with("POST http://example.test/api HTTP/1.1\r\n"));
        assert!(dump.contains("Content-Type: application/json\r\n"));
        assert!(dump.contains("Content-Length: 7\r\n"));
        assert!(dump.ends_with("\r\n\r\n{\"a\":1}"));
    }

    #[test]
    fn response_dump_has_status_line() {
        let resp = HttpResponse {
            status: 404,
            headers: vec![("content-length".to_string(), "9".to_string())],
            body: b"not found".to_vec(),
        };
        let dump = resp.dump();
        assert!(dump.starts_with("HTTP/1.1 404\r\n"));
        assert!(dump.ends_with("not found"));
        assert_eq!(resp.header("Content-Length"), Some("9"));
    }
}
