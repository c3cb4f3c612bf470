pub mod tls;

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Multipart, Path},
    http::{HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of a request, returned by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// One decoded part of a `multipart/form-data` body.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/echo", any(echo))
        .route("/multipart", post(multipart))
        .route("/delay/{secs}", any(delay))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn ping() -> &'static str {
    "pong"
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn multipart(mut form: Multipart) -> Result<Json<Vec<Part>>, StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = form.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let content = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(Part {
            name,
            filename,
            content_type,
            content,
        });
    }
    Ok(Json(parts))
}

async fn delay(Path(secs): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_secs(secs)).await;
    "done"
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let code = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((code, format!("status {}", code.as_u16())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_headers_as_pairs() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            headers: vec![("x-a".to_string(), "1".to_string())],
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["headers"][0][0], "x-a");
        assert_eq!(json["headers"][0][1], "1");
    }

    #[test]
    fn part_roundtrips_through_json() {
        let part = Part {
            name: "file".to_string(),
            filename: Some("x.txt".to_string()),
            content_type: Some("application/octet-stream".to_string()),
            content: "hello".to_string(),
        };
        let json = serde_json::to_string(&part).unwrap();
        let back: Part = serde_json::from_str(&json).unwrap();
        assert_eq!(back, part);
    }

    #[test]
    fn value_part_has_no_filename() {
        let part: Part =
            serde_json::from_str(r#"{"name":"name","filename":null,"content_type":null,"content":"bob"}"#)
                .unwrap();
        assert!(part.filename.is_none());
        assert_eq!(part.content, "bob");
    }
}
