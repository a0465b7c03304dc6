//! C ABI for hoard tracked arenas.
//!
//! Exposes create/destroy/alloc/realloc/free over opaque `u64` arena
//! handles, for callers that cannot see the Rust `Arena` type. This crate
//! is one of two that may contain `unsafe` code (along with `hoard-arena`).
//!
//! Every function returns an `i32` [`HoardStatus`](status::HoardStatus)
//! (`0` on success, negative on error) and writes results through
//! out-pointers. Panics never cross the boundary; they are caught and
//! reported as `HOARD_STATUS_PANICKED`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting any panic into `HoardStatus::Panicked`.
///
/// `return` inside the body returns from the guarded closure, so early
/// exits with a status code work as expected.
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(status) => status,
            Err(_) => $crate::status::HoardStatus::Panicked as i32,
        }
    };
}

/// Lock a mutex inside `ffi_guard!`, returning `InternalError` if it was
/// poisoned by an earlier panic.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::HoardStatus::InternalError as i32,
        }
    };
}

pub mod arena;
mod handle;
pub mod logging;
pub mod status;
pub mod types;
