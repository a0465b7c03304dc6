//! C-compatible status codes.
//!
//! [`HoardStatus`] is a `repr(i32)` enum returned by every FFI function.
//! Arena errors convert via `From<&ArenaError>`.

use hoard_arena::ArenaError;

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoardStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or the arena was already destroyed.
    InvalidHandle = -1,
    /// A required out-pointer is null, or an enum value is out of range.
    InvalidArgument = -2,
    /// The address is not a live block of this arena
    /// (only returned under the `Report` misuse policy).
    NotOwned = -3,
    /// The underlying allocator is exhausted.
    OutOfMemory = -4,
    /// Alignment is not a power of two.
    InvalidAlignment = -5,
    /// Size rounded up to the alignment overflows.
    SizeOverflow = -6,
    /// Internal error (e.g. an arena poisoned by an earlier panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArenaError> for HoardStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::NotOwned { .. } => HoardStatus::NotOwned,
            ArenaError::OutOfMemory { .. } => HoardStatus::OutOfMemory,
            ArenaError::InvalidAlignment { .. } => HoardStatus::InvalidAlignment,
            ArenaError::SizeOverflow { .. } => HoardStatus::SizeOverflow,
        }
    }
}
