//! Blocking JSON-over-HTTP client.
//!
//! # Overview
//! `JsonClient` issues GET/POST/PUT/DELETE calls, checks the status, and
//! decodes a 200 body into whatever type the caller asks for. Callers get
//! the decoded value or one `ApiError`; no status or JSON handling leaks out.
//!
//! # Design
//! - Two seams: `Transport` executes requests (default `UreqTransport`),
//!   `CodecFactory` produces JSON codecs (default `JsonCodecFactory`).
//! - Requests and responses are plain data (`HttpRequest`, `HttpResponse`),
//!   so a stub transport can stand in for the network in tests.
//! - One transport per client, created at construction and reused.
//! - Events are emitted through `tracing`; installing a subscriber is up to
//!   the application.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
mod rename;
pub mod transport;

pub use client::JsonClient;
pub use codec::{Codec, CodecFactory, FieldNaming, JsonCodec, JsonCodecFactory};
pub use config::{CertificateVerification, ClientConfig};
pub use error::{ApiError, CodecError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, JSON_CONTENT_TYPE};
pub use transport::{Transport, UreqTransport};
