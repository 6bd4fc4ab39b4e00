//! Error types for the JSON client.
//!
//! # Design
//! Callers see two network-facing kinds, `ResourceNotFound` and
//! `Unauthorized`, plus `InvalidInput` for mistakes in the calling code.
//! Several unrelated causes are folded into the network-facing kinds:
//!
//! - transport failures and undecodable bodies surface as `ResourceNotFound`;
//! - every non-200 status other than 404 surfaces as `Unauthorized`.
//!
//! The second fold treats "bad request" and server errors as authorization
//! failures. It is kept because existing callers match on it, but it is
//! probably a defect; `Unauthorized::status` carries the real code so callers
//! can tell the cases apart.
//!
//! `CodecError` and `TransportError` are the collaborator-level errors. They
//! never reach callers of `JsonClient` directly.

use thiserror::Error;

/// Errors returned by `JsonClient` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404, a transport failure, or a body that could not be decoded.
    #[error("{0}")]
    ResourceNotFound(String),

    /// 401, or any other status that is neither 200 nor 404.
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// The address or the payload was unusable. Indicates a bug in the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::ResourceNotFound(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// Failure inside a [`Codec`](crate::codec::Codec).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("deserialization failed: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Failure inside a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Send(String),

    /// A response arrived but its body could not be read.
    #[error("reading response body failed: {0}")]
    Read(String),
}
