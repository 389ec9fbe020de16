//! Blocking HTTP(S) transport.
//!
//! A `cacert` adds a trusted root for the daemon's certificate; `cert` plus
//! `key` present a client identity for mutual TLS.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Identity};
use tracing::debug;

use crate::error::TransportError;
use crate::request::{HttpRequest, Method};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS material, as file paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsFiles<'a> {
    pub cacert: Option<&'a Path>,
    pub cert: Option<&'a Path>,
    pub key: Option<&'a Path>,
}

/// A daemon answer. The body is kept raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `200 OK` style status line.
    pub fn status_line(&self) -> String {
        if self.reason.is_empty() {
            self.status.to_string()
        } else {
            format!("{} {}", self.status, self.reason)
        }
    }
}

pub struct Transport {
    client: Client,
    daemon_url: String,
}

fn read_material(path: &Path) -> Result<Vec<u8>, TransportError> {
    fs::read(path).map_err(|source| TransportError::TlsMaterial {
        path: path.display().to_string(),
        source,
    })
}

impl Transport {
    /// `daemon_url` is only used to word connection failures.
    pub fn new(daemon_url: &str, tls: TlsFiles<'_>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if let Some(cacert) = tls.cacert {
            let pem = read_material(cacert)?;
            builder = builder
                .add_root_certificate(Certificate::from_pem(&pem)?)
                .tls_built_in_root_certs(false);
            debug!(path = %cacert.display(), "trusting daemon CA certificate");
        }

        if let (Some(cert), Some(key)) = (tls.cert, tls.key) {
            let mut pem = read_material(cert)?;
            pem.push(b'\n');
            pem.extend(read_material(key)?);
            builder = builder.identity(Identity::from_pem(&pem)?);
            debug!(cert = %cert.display(), "presenting client certificate");
        }

        Ok(Self {
            client: builder.build()?,
            daemon_url: daemon_url.to_string(),
        })
    }

    pub fn perform(&self, request: &HttpRequest) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
            Method::Options => reqwest::Method::OPTIONS,
        };

        let mut builder = self.client.request(method, &request.url);
        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        debug!(method = %request.method, url = %request.url, "sending request");
        let response = builder.send().map_err(|err| self.classify(err))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let body = response.bytes().map_err(|err| self.classify(err))?.to_vec();
        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok(Response {
            status: status.as_u16(),
            reason,
            body,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_connect() {
            debug!(error = %err, "connection failed");
            TransportError::Unreachable {
                url: self.daemon_url.clone(),
            }
        } else {
            TransportError::Http(err)
        }
    }
}
