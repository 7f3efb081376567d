//! C-ABI wrapper around `webreq-core`.
//!
//! # Overview
//! Lets a host application written in any language with a C FFI issue the
//! four request variants (`webreq_get`, `webreq_post`, `webreq_aget`,
//! `webreq_apost`) and forward its `ChangeHost` command, without linking to
//! Rust types directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Arguments travel as a nullable JSON object string; null means "no
//!   arguments", which for GET is different from `{}`.
//! - Blocking calls return a heap-allocated `FfiOutcome` that the caller
//!   frees with `webreq_free_outcome`.
//! - Non-blocking calls return an `FfiStatus` immediately and later invoke
//!   exactly one of the two callbacks on a worker thread.

pub mod types;

use std::ffi::{c_void, CStr};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use tracing_subscriber::EnvFilter;
use webreq_core::{Args, Config, Continuations, HttpMethod, WebreqError};

use types::*;

/// Read a nullable C string. Invalid UTF-8 is replaced, not rejected.
fn read_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Null means absent; anything else must be a JSON object of scalars.
fn read_args(args_json: *const c_char) -> Result<Option<Args>, WebreqError> {
    read_str(args_json).map(|json| Args::from_json(&json)).transpose()
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Install a stderr log subscriber filtered by `RUST_LOG` (default
/// `webreq_core=info`). Returns false if a subscriber was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_init_logging() -> bool {
    catch_unwind(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("webreq_core=info")),
            )
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client from startup parameters.
///
/// Both arguments may be null. A null or blank `host` means `127.0.0.1`; a
/// null or non-numeric `timeout_ms` means 3000.
/// The caller must free the returned pointer with `webreq_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_client_new(
    host: *const c_char,
    timeout_ms: *const c_char,
) -> *mut FfiClient {
    catch_unwind(|| {
        let host = read_str(host);
        let timeout = read_str(timeout_ms);
        let config = Config::from_params(host.as_deref(), timeout.as_deref());
        let client = webreq_core::Client::new(config);
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from `WEBREQ_HOST` and `WEBREQ_TIMEOUT`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_client_from_env() -> *mut FfiClient {
    catch_unwind(|| {
        let client = webreq_core::Client::new(Config::from_env());
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `webreq_client_new`. Safe to call with null.
///
/// Asynchronous requests already in flight keep running and still invoke
/// their callbacks.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Host configuration
// ---------------------------------------------------------------------------

/// Replace the host used by subsequent requests. No validation is done.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_set_host(client: *const FfiClient, host: *const c_char) -> FfiStatus {
    catch_unwind(|| {
        if client.is_null() || host.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &*client };
        if let Some(host) = read_str(host) {
            client.inner.set_host(host);
        }
        FfiStatus::Ok
    })
    .unwrap_or(FfiStatus::Panic)
}

/// Copy the current host into a new C string. Free it with
/// `webreq_free_string`. Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_host(client: *const FfiClient) -> *mut c_char {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        into_c_string(client.inner.host()).into_raw()
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Apply a host command line such as `ChangeHost http://10.0.0.2/`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_dispatch_command(
    client: *const FfiClient,
    line: *const c_char,
) -> FfiStatus {
    catch_unwind(|| {
        if client.is_null() || line.is_null() {
            return FfiStatus::NullArg;
        }
        let client = unsafe { &*client };
        let line = read_str(line).unwrap_or_default();
        match client.inner.dispatch_line(&line) {
            Ok(()) => FfiStatus::Ok,
            Err(e) => {
                tracing::warn!(error = %e, "rejected host command");
                FfiStatus::from(&e)
            }
        }
    })
    .unwrap_or(FfiStatus::Panic)
}

// ---------------------------------------------------------------------------
// Blocking requests
// ---------------------------------------------------------------------------

fn blocking(
    client: *const FfiClient,
    method: HttpMethod,
    path: *const c_char,
    args_json: *const c_char,
) -> *mut FfiOutcome {
    if client.is_null() {
        return FfiOutcome::null_arg("client");
    }
    if path.is_null() {
        return FfiOutcome::null_arg("path");
    }
    let client = unsafe { &*client };
    let path = read_str(path).unwrap_or_default();
    let args = match read_args(args_json) {
        Ok(args) => args,
        Err(e) => return FfiOutcome::from_error(e),
    };

    let outcome = match method {
        HttpMethod::Get => client.inner.get(&path, args.as_ref()),
        HttpMethod::Post => client.inner.post(&path, args.as_ref()),
    };
    match outcome {
        Ok(outcome) => FfiOutcome::from_core(outcome),
        Err(e) => FfiOutcome::from_error(e),
    }
}

/// Blocking GET. `args_json` may be null.
/// The caller must free the result with `webreq_free_outcome`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_get(
    client: *const FfiClient,
    path: *const c_char,
    args_json: *const c_char,
) -> *mut FfiOutcome {
    catch_unwind(|| blocking(client, HttpMethod::Get, path, args_json))
        .unwrap_or_else(|_| FfiOutcome::panic("panic in webreq_get"))
}

/// Blocking POST with the arguments sent as a JSON body. `args_json` may be
/// null, which sends `{}`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_post(
    client: *const FfiClient,
    path: *const c_char,
    args_json: *const c_char,
) -> *mut FfiOutcome {
    catch_unwind(|| blocking(client, HttpMethod::Post, path, args_json))
        .unwrap_or_else(|_| FfiOutcome::panic("panic in webreq_post"))
}

// ---------------------------------------------------------------------------
// Non-blocking requests
// ---------------------------------------------------------------------------

fn continuations(
    on_success: FfiSuccessCallback,
    on_failure: FfiFailureCallback,
    user_data: *mut c_void,
) -> Continuations {
    let user_data = UserData::new(user_data);
    let mut continuations = Continuations::new();
    if let Some(cb) = on_success {
        continuations = continuations.on_success(move |body| {
            let body = into_c_string(body);
            cb(body.as_ptr(), user_data.get());
        });
    }
    if let Some(cb) = on_failure {
        continuations = continuations.on_failure(move || cb(user_data.get()));
    }
    continuations
}

fn non_blocking(
    client: *const FfiClient,
    method: HttpMethod,
    path: *const c_char,
    args_json: *const c_char,
    continuations: Continuations,
) -> FfiStatus {
    if client.is_null() || path.is_null() {
        return FfiStatus::NullArg;
    }
    let client = unsafe { &*client };
    let path = read_str(path).unwrap_or_default();
    let args = match read_args(args_json) {
        Ok(args) => args,
        Err(e) => return FfiStatus::from(&e),
    };

    let pending = match method {
        HttpMethod::Get => client.inner.aget(&path, args.as_ref(), continuations),
        HttpMethod::Post => client.inner.apost(&path, args.as_ref(), continuations),
    };
    match pending {
        Ok(_) => FfiStatus::Ok,
        Err(e) => FfiStatus::from(&e),
    }
}

/// Non-blocking GET.
///
/// On `Ok`, exactly one callback (if non-null) is later invoked on a worker
/// thread with `user_data`. On any other status no callback is invoked.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_aget(
    client: *const FfiClient,
    path: *const c_char,
    args_json: *const c_char,
    on_success: FfiSuccessCallback,
    on_failure: FfiFailureCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    catch_unwind(|| {
        let continuations = continuations(on_success, on_failure, user_data);
        non_blocking(client, HttpMethod::Get, path, args_json, continuations)
    })
    .unwrap_or(FfiStatus::Panic)
}

/// Non-blocking POST. Same callback contract as `webreq_aget`.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_apost(
    client: *const FfiClient,
    path: *const c_char,
    args_json: *const c_char,
    on_success: FfiSuccessCallback,
    on_failure: FfiFailureCallback,
    user_data: *mut c_void,
) -> FfiStatus {
    catch_unwind(|| {
        let continuations = continuations(on_success, on_failure, user_data);
        non_blocking(client, HttpMethod::Post, path, args_json, continuations)
    })
    .unwrap_or(FfiStatus::Panic)
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiOutcome` returned by `webreq_get` or `webreq_post`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_free_outcome(outcome: *mut FfiOutcome) {
    if outcome.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let outcome = unsafe { Box::from_raw(outcome) };
        if !outcome.result.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(outcome.result) });
        }
        if !outcome.error_message.is_null() {
            drop(unsafe { std::ffi::CString::from_raw(outcome.error_message) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn webreq_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { std::ffi::CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
