//! HTTP request and response types exchanged with a [`Transport`].
//!
//! # Design
//! Requests and responses are plain data. `JsonClient` builds an
//! `HttpRequest`, hands it to its transport, and classifies the returned
//! `HttpResponse`. Keeping these as owned values lets a stub transport record
//! what was sent and replay canned responses without any network.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;

/// Media type attached to every request that carries a body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// A request without a body (GET, DELETE).
    pub fn empty(method: HttpMethod, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// A request carrying a JSON body (POST, PUT).
    pub fn json(method: HttpMethod, url: &str, body: String) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
            body: Some(body),
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
