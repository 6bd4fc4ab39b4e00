//! C-ABI wrapper around `json-client-core`.
//!
//! # Overview
//! Exposes the four verbs through `extern "C"` functions. Payloads go in as
//! JSON text and decoded responses come back as JSON text, so any language
//! with a C FFI can use the client without knowing Rust types.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Responses are decoded into `serde_json::Value`; the status and
//!   error-kind mapping is the core client's.
//! - The C caller owns all returned pointers and must call the matching
//!   `jc_*_free` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use json_client_core::{ClientConfig, HttpMethod, JsonClient, JsonCodecFactory};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client. `use_tls` restricts it to `https://` addresses;
/// `accept_invalid_certs` turns off all certificate checks (host name, chain,
/// expiry) and is ignored unless `use_tls` is set.
///
/// Returns null if an internal panic occurs.
/// The caller must free the returned pointer with `jc_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn jc_client_new(use_tls: bool, accept_invalid_certs: bool) -> *mut FfiJsonClient {
    catch_unwind(|| {
        let mut config = if use_tls {
            ClientConfig::tls()
        } else {
            ClientConfig::plain()
        };
        if accept_invalid_certs {
            config = config.accept_invalid_certs();
        }
        let inner = JsonClient::with_config(JsonCodecFactory::default(), config);
        Box::into_raw(Box::new(FfiJsonClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `jc_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jc_client_free(client: *mut FfiJsonClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// GET `url` and return the decoded JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn jc_get(client: *const FfiJsonClient, url: *const c_char) -> *mut FfiCallResult {
    guarded("jc_get", || call(client, url, HttpMethod::Get, None))
}

/// DELETE `url` and return the decoded JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn jc_delete(client: *const FfiJsonClient, url: *const c_char) -> *mut FfiCallResult {
    guarded("jc_delete", || call(client, url, HttpMethod::Delete, None))
}

/// POST `payload` (JSON text) to `url` and return the decoded JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn jc_post(
    client: *const FfiJsonClient,
    url: *const c_char,
    payload: *const c_char,
) -> *mut FfiCallResult {
    guarded("jc_post", || call(client, url, HttpMethod::Post, Some(payload)))
}

/// PUT `payload` (JSON text) to `url` and return the decoded JSON body.
#[unsafe(no_mangle)]
pub extern "C" fn jc_put(
    client: *const FfiJsonClient,
    url: *const c_char,
    payload: *const c_char,
) -> *mut FfiCallResult {
    guarded("jc_put", || call(client, url, HttpMethod::Put, Some(payload)))
}

fn guarded(name: &str, f: impl FnOnce() -> *mut FfiCallResult) -> *mut FfiCallResult {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| FfiCallResult::panic(&format!("panic in {name}")))
}

fn call(
    client: *const FfiJsonClient,
    url: *const c_char,
    method: HttpMethod,
    payload: Option<*const c_char>,
) -> *mut FfiCallResult {
    if client.is_null() {
        return FfiCallResult::null_arg("client");
    }
    if url.is_null() {
        return FfiCallResult::null_arg("url");
    }
    let client = unsafe { &*client };
    let Ok(url) = unsafe { CStr::from_ptr(url) }.to_str() else {
        return FfiCallResult::invalid_input("url is not valid UTF-8");
    };

    let body = match payload {
        None => None,
        Some(p) if p.is_null() => return FfiCallResult::null_arg("payload"),
        Some(p) => {
            let Ok(text) = unsafe { CStr::from_ptr(p) }.to_str() else {
                return FfiCallResult::invalid_input("payload is not valid UTF-8");
            };
            match serde_json::from_str::<Value>(text) {
                Ok(value) => Some(value),
                Err(e) => return FfiCallResult::invalid_input(&format!("payload is not JSON: {e}")),
            }
        }
    };

    let result = match (method, body) {
        (HttpMethod::Get, _) => client.inner.get::<Value>(url),
        (HttpMethod::Delete, _) => client.inner.delete::<Value>(url),
        (HttpMethod::Post, Some(body)) => client.inner.post::<Value, _>(url, &body),
        (HttpMethod::Put, Some(body)) => client.inner.put::<Value, _>(url, &body),
        (HttpMethod::Post | HttpMethod::Put, None) => {
            return FfiCallResult::null_arg("payload");
        }
    };

    match result {
        Ok(value) => FfiCallResult::ok(&value),
        Err(e) => FfiCallResult::from_error(e),
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiCallResult` returned by any call function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn jc_free_result(result: *mut FfiCallResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.body.is_null() {
            drop(unsafe { CString::from_raw(result.body) });
        }
    }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
