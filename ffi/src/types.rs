//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! `FfiOutcome` mirrors the core `Outcome` as a `{result, error}` pair that a
//! C host can read without knowing Rust enums, plus a status code for calls
//! that never reached the transport. Callbacks are plain C function pointers
//! with an opaque `user_data` pointer threaded through unchanged.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use webreq_core::{Outcome, WebreqError};

/// Opaque handle to a `Client`. C callers receive a pointer to this and pass
/// it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: webreq_core::Client,
}

/// Status of an FFI call itself, independent of any HTTP status.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidArgs = 2,
    InvalidRequest = 3,
    UnknownCommand = 4,
    Spawn = 5,
    Panic = 6,
}

impl From<&WebreqError> for FfiStatus {
    fn from(err: &WebreqError) -> Self {
        match err {
            WebreqError::InvalidRequest(_) => FfiStatus::InvalidRequest,
            WebreqError::Spawn(_) => FfiStatus::Spawn,
            WebreqError::InvalidArgs(_) => FfiStatus::InvalidArgs,
            WebreqError::UnknownCommand(_) | WebreqError::MissingCommandValue(_) => {
                FfiStatus::UnknownCommand
            }
        }
    }
}

/// Outcome of a blocking request.
///
/// When `status` is `Ok`, exactly one of these holds: `result` points to the
/// response body and `error` is `-1`, or `result` is null and `error` is the
/// HTTP status (`0` if no server answered). When `status` is not `Ok`,
/// `result` is null, `error` is `-1` and `error_message` explains why.
#[repr(C)]
pub struct FfiOutcome {
    pub status: FfiStatus,
    pub error_message: *mut c_char,
    pub result: *mut c_char,
    pub error: i32,
}

impl FfiOutcome {
    pub(crate) fn from_core(outcome: Outcome) -> *mut Self {
        let (result, error) = match outcome {
            Outcome::Success(body) => (into_c_string(body).into_raw(), -1),
            Outcome::Failure(status) => (std::ptr::null_mut(), i32::from(status)),
        };
        Box::into_raw(Box::new(FfiOutcome {
            status: FfiStatus::Ok,
            error_message: std::ptr::null_mut(),
            result,
            error,
        }))
    }

    pub(crate) fn from_error(err: WebreqError) -> *mut Self {
        Self::failed(FfiStatus::from(&err), err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failed(FfiStatus::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failed(FfiStatus::Panic, msg.to_string())
    }

    fn failed(status: FfiStatus, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiOutcome {
            status,
            error_message: into_c_string(msg).into_raw(),
            result: std::ptr::null_mut(),
            error: -1,
        }))
    }
}

/// Called with the response body, which is only valid for the duration of
/// the call, and the caller's `user_data`.
pub type FfiSuccessCallback = Option<extern "C" fn(body: *const c_char, user_data: *mut c_void)>;

/// Called with the caller's `user_data` when a request does not succeed.
pub type FfiFailureCallback = Option<extern "C" fn(user_data: *mut c_void)>;

/// Caller-owned pointer handed back to callbacks on the worker thread.
#[derive(Clone, Copy)]
pub(crate) struct UserData(*mut c_void);

// The pointer is never dereferenced on the Rust side; thread-safety of what
// it points to is the C caller's contract.
unsafe impl Send for UserData {}

impl UserData {
    pub(crate) fn new(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub(crate) fn get(self) -> *mut c_void {
        self.0
    }
}

/// Convert to a C string, cutting at the first interior NUL.
pub(crate) fn into_c_string(s: String) -> CString {
    CString::new(s).unwrap_or_else(|e| {
        let pos = e.nul_position();
        let mut bytes = e.into_vec();
        bytes.truncate(pos);
        CString::new(bytes).unwrap_or_default()
    })
}
