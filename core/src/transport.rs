//! HTTP transport seam.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and returns the response as data,
//! whatever its status. `JsonClient` owns exactly one transport for its whole
//! lifetime and reuses it for every call; dropping the client releases it.
//!
//! `UreqTransport` is the default. It holds a single `ureq::Agent` built with
//! `http_status_as_error(false)` so 4xx/5xx responses come back as values and
//! the client, not ureq, decides what they mean.

use std::fmt;

use tracing::warn;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::config::{CertificateVerification, ClientConfig};
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes HTTP requests for a `JsonClient`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a single `ureq::Agent`.
pub struct UreqTransport {
    agent: Agent,
    verification: CertificateVerification,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport")
            .field("verification", &self.verification)
            .finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        let mut builder = Agent::config_builder()
            .http_status_as_error(false)
            .https_only(config.use_tls);

        let verification = if config.use_tls {
            config.certificate_verification
        } else {
            CertificateVerification::Full
        };
        if verification == CertificateVerification::Disabled {
            warn!("TLS certificate verification disabled; any server certificate is accepted");
            let tls = TlsConfig::builder().disable_verification(true).build();
            builder = builder.tls_config(tls);
        }

        Self {
            agent: builder.build().new_agent(),
            verification,
        }
    }

    /// The certificate checks this transport actually applies.
    pub fn certificate_verification(&self) -> CertificateVerification {
        self.verification
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), request).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), request).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), request).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), request).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), request).send_empty(),
        };
        let mut response = result.map_err(|e| TransportError::Send(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        // Only a 200 body is ever decoded; a broken body on any other status
        // must not hide the status itself.
        let body = match response.body_mut().read_to_string() {
            Ok(body) => body,
            Err(e) if status == 200 => return Err(TransportError::Read(e.to_string())),
            Err(_) => String::new(),
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, request: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
