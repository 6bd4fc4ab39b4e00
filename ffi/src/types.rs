//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Decoded values cross the boundary as JSON text: the C side never sees a
//! Rust type, only `FfiCallResult` with a status code and a C string.
//! Conversion helpers live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use json_client_core::ApiError;

/// Opaque handle to a `JsonClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiJsonClient {
    pub(crate) inner: json_client_core::JsonClient,
}

/// Error codes returned in `FfiCallResult`.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    ResourceNotFound = 1,
    Unauthorized = 2,
    InvalidInput = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for every call.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `body`
/// holds the decoded response re-serialized as JSON.
/// On failure `body` is null and `error_message` is a human-readable C
/// string. `http_status` is set for `Unauthorized` and 0 otherwise.
#[repr(C)]
pub struct FfiCallResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut c_char,
}

impl FfiCallResult {
    pub(crate) fn ok(value: &serde_json::Value) -> *mut Self {
        Self::boxed(FfiErrorCode::Ok, None, 0, Some(value.to_string()))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::ResourceNotFound(_) => (FfiErrorCode::ResourceNotFound, 0),
            ApiError::Unauthorized { status, .. } => (FfiErrorCode::Unauthorized, *status),
            ApiError::InvalidInput(_) => (FfiErrorCode::InvalidInput, 0),
        };
        Self::boxed(code, Some(err.to_string()), status, None)
    }

    pub(crate) fn invalid_input(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::InvalidInput, Some(format!("invalid input: {msg}")), 0, None)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, Some(format!("null argument: {name}")), 0, None)
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, Some(msg.to_string()), 0, None)
    }

    fn boxed(
        error_code: FfiErrorCode,
        message: Option<String>,
        http_status: u16,
        body: Option<String>,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiCallResult {
            error_code,
            error_message: into_c_string(message),
            http_status,
            body: into_c_string(body),
        }))
    }
}

fn into_c_string(s: Option<String>) -> *mut c_char {
    match s {
        Some(s) => CString::new(s).unwrap_or_default().into_raw(),
        None => std::ptr::null_mut(),
    }
}
