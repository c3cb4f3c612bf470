//! Standalone echo server for trying gridcurl by hand.
//!
//! Listens on `127.0.0.1:$PORT` (default 9999). When `TLS_CERT`, `TLS_KEY`
//! and `TLS_CLIENT_CA` all name PEM files it serves HTTPS and requires a
//! client certificate issued by `TLS_CLIENT_CA`.

use std::{env, fs, io};

use tokio::net::TcpListener;

struct TlsFiles {
    cert: String,
    key: String,
    client_ca: String,
}

impl TlsFiles {
    fn from_env() -> Option<Self> {
        Some(Self {
            cert: env::var("TLS_CERT").ok()?,
            key: env::var("TLS_KEY").ok()?,
            client_ca: env::var("TLS_CLIENT_CA").ok()?,
        })
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let port = env::var("PORT").unwrap_or_else(|_| "9999".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;

    match TlsFiles::from_env() {
        Some(files) => {
            let acceptor = mock_server::tls::acceptor(
                &fs::read(&files.cert)?,
                &fs::read(&files.key)?,
                &fs::read(&files.client_ca)?,
            )?;
            println!("echo server listening on https://{addr}");
            mock_server::tls::run_tls(listener, acceptor).await
        }
        None => {
            println!("echo server listening on http://{addr}");
            mock_server::run(listener).await
        }
    }
}
