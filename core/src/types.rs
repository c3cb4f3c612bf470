//! Inputs of a single invocation.
//!
//! # Design
//! `RequestSpec` is assembled once from the command line and never mutated.
//! Headers and form fields keep the order they were given in; a repeated
//! name replaces the earlier value in place, so each name is sent once.

use std::path::PathBuf;

use crate::error::Error;
use crate::http::HttpMethod;

/// Prefix meaning "the rest of this value is a path whose contents replace it".
pub const INDIRECTION_MARKER: char = '@';

/// Ordered, case-sensitive header set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// Ordered form fields. A value starting with `@` names a file to upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormFields::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Everything needed to build and send one request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub url: String,
    pub method: HttpMethod,
    /// Raw payload, or `@path` to read it from a file.
    pub data: Option<String>,
    pub headers: Headers,
    pub form: FormFields,
    pub output: Option<PathBuf>,
    /// Whole-client timeout in seconds; 0 disables it.
    pub timeout_secs: u64,
    pub verbosity: u8,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            data: None,
            headers: Headers::new(),
            form: FormFields::new(),
            output: None,
            timeout_secs: 0,
            verbosity: 0,
        }
    }

    /// The raw payload, if one was given and it is non-empty.
    pub fn raw_data(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.is_empty())
    }
}

/// Parse a `name:value` header argument.
///
/// Splits on the first `:` so values such as `host:8080` survive; both sides
/// are trimmed and the name must be non-empty.
pub fn parse_header(arg: &str) -> Result<(String, String), Error> {
    let (name, value) = arg
        .trim()
        .split_once(':')
        .ok_or_else(|| Error::Input(format!("fail to parse input HTTP header: {arg:?}")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Input(format!("empty HTTP header name: {arg:?}")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a `name=value` form argument, splitting on the first `=`.
pub fn parse_form_field(arg: &str) -> Result<(String, String), Error> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| Error::Input(format!("fail to parse input form: {arg:?}")))?;
    if name.is_empty() {
        return Err(Error::Input(format!("empty form field name: {arg:?}")));
    }
    Ok((name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_splits_on_first_colon_and_trims() {
        let (name, value) = parse_header(" Host : example.test:8443 ").unwrap();
        assert_eq!(name, "Host");
        assert_eq!(value, "example.test:8443");
    }

    #[test]
    fn header_without_colon_is_input_error() {
        assert!(matches!(parse_header("Content-Type"), Err(Error::Input(_))));
        assert!(matches!(parse_header(":value"), Err(Error::Input(_))));
    }

    #[test]
    fn form_value_keeps_later_equals_signs() {
        let (name, value) = parse_form_field("q=a=b").unwrap();
        assert_eq!(name, "q");
        assert_eq!(value, "a=b");
        assert!(matches!(parse_form_field("novalue"), Err(Error::Input(_))));
    }

    #[test]
    fn repeated_header_replaces_in_place() {
        let headers: Headers = [("A", "1"), ("B", "2"), ("A", "3")].into_iter().collect();
        let entries: Vec<_> = headers.iter().collect();
        assert_eq!(entries, vec![("A", "3"), ("B", "2")]);
    }

    #[test]
    fn repeated_form_field_keeps_last_value_once() {
        let form: FormFields = [("name", "alice"), ("file", "@/tmp/x"), ("name", "bob")]
            .into_iter()
            .collect();
        let entries: Vec<_> = form.iter().collect();
        assert_eq!(entries, vec![("name", "bob"), ("file", "@/tmp/x")]);
        assert_eq!(form.get("name"), Some("bob"));
    }

    #[test]
    fn header_names_are_case_sensitive() {
        let headers: Headers = [("X-Token", "1"), ("x-token", "2")].into_iter().collect();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-token"), Some("2"));
    }

    #[test]
    fn empty_data_is_not_raw_data() {
        let mut spec = RequestSpec::new(HttpMethod::Post, "http://example.test");
        spec.data = Some(String::new());
        assert!(spec.raw_data().is_none());
        spec.data = Some("x".into());
        assert_eq!(spec.raw_data(), Some("x"));
    }
}
