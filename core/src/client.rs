//! The call executor.
//!
//! # Design
//! Every verb goes through the same path: validate the address, build an
//! `HttpRequest`, execute it on the owned transport, classify the status,
//! decode a 200 body through a fresh codec. A call returns one decoded value
//! or exactly one `ApiError`; nothing is retried.
//!
//! Status classification is exact: only 200 is success. 404 maps to
//! `ResourceNotFound`, everything else to `Unauthorized`. Transport and
//! decoding failures also map to `ResourceNotFound`. See `error.rs` for why
//! these folds are kept.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;

use crate::codec::{Codec, CodecFactory, JsonCodecFactory};
use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

/// Blocking JSON client over a single owned transport.
///
/// The result type of each call is chosen by the caller:
///
/// ```no_run
/// # use json_client_core::JsonClient;
/// # #[derive(serde::Deserialize)] struct User { id: u64, name: String }
/// let client = JsonClient::new();
/// let user: User = client.get("http://localhost:3000/users/42")?;
/// # Ok::<(), json_client_core::ApiError>(())
/// ```
#[derive(Debug)]
pub struct JsonClient<F = JsonCodecFactory, T = UreqTransport> {
    factory: F,
    transport: T,
}

impl JsonClient {
    /// Default codec, plaintext, strict host name verification.
    pub fn new() -> Self {
        Self::with_config(JsonCodecFactory::default(), ClientConfig::default())
    }
}

impl Default for JsonClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: CodecFactory> JsonClient<F, UreqTransport> {
    pub fn with_codec_factory(factory: F) -> Self {
        Self::with_config(factory, ClientConfig::default())
    }

    pub fn with_config(factory: F, config: ClientConfig) -> Self {
        Self::from_parts(UreqTransport::new(&config), factory)
    }
}

impl<F: CodecFactory, T: Transport> JsonClient<F, T> {
    /// Build a client around an existing transport.
    pub fn from_parts(transport: T, factory: F) -> Self {
        Self { factory, transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn get<R: DeserializeOwned>(&self, address: &str) -> Result<R, ApiError> {
        validate_address(address)?;
        self.perform(HttpRequest::empty(HttpMethod::Get, address))
    }

    pub fn post<R, P>(&self, address: &str, payload: &P) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.build_with_body(HttpMethod::Post, address, payload)?;
        self.perform(request)
    }

    pub fn put<R, P>(&self, address: &str, payload: &P) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let request = self.build_with_body(HttpMethod::Put, address, payload)?;
        self.perform(request)
    }

    pub fn delete<R: DeserializeOwned>(&self, address: &str) -> Result<R, ApiError> {
        validate_address(address)?;
        self.perform(HttpRequest::empty(HttpMethod::Delete, address))
    }

    fn build_with_body<P: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        address: &str,
        payload: &P,
    ) -> Result<HttpRequest, ApiError> {
        validate_address(address)?;
        let body = self.factory.new_codec().to_json(payload).map_err(|e| {
            ApiError::InvalidInput(format!(
                "payload for {method} {address} could not be encoded: {e}"
            ))
        })?;
        Ok(HttpRequest::json(method, address, body))
    }

    fn perform<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        info!(method = %request.method, url = %request.url, "calling resource");

        let response = self.transport.execute(&request).map_err(|e| {
            error!(url = %request.url, error = %e, "transport failure");
            match e {
                TransportError::Send(_) => ApiError::ResourceNotFound(
                    "Unexpected communication problem with the given resource".to_string(),
                ),
                TransportError::Read(_) => ApiError::ResourceNotFound(
                    "Unexpected communication reading problem with the given resource".to_string(),
                ),
            }
        })?;

        check_status(&response, &request.url)?;

        self.factory.new_codec().from_json(&response.body).map_err(|e| {
            error!(url = %request.url, error = %e, "unexpected response body");
            ApiError::ResourceNotFound("Unexpected response received".to_string())
        })
    }
}

fn validate_address(address: &str) -> Result<(), ApiError> {
    if address.trim().is_empty() {
        return Err(ApiError::InvalidInput("address is empty".to_string()));
    }
    Url::parse(address)
        .map(|_| ())
        .map_err(|e| ApiError::InvalidInput(format!("address {address:?} is not a valid URL: {e}")))
}

/// Map every status except 200 to an `ApiError`.
fn check_status(response: &HttpResponse, url: &str) -> Result<(), ApiError> {
    match response.status {
        200 => Ok(()),
        404 => {
            warn!(url, "resource not found");
            Err(ApiError::ResourceNotFound(format!("Resource not found in {url}")))
        }
        401 => {
            warn!(url, "not authorized to access the resource");
            Err(ApiError::Unauthorized {
                status: 401,
                message: format!("Your user is not authorized to access to the resource: {url}"),
            })
        }
        status => {
            // Any other status is reported as Unauthorized, including 5xx.
            warn!(url, status, "bad request from the server");
            Err(ApiError::Unauthorized {
                status,
                message: format!("Bad request to the resource: {url}"),
            })
        }
    }
}
