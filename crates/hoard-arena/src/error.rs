//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// The arena operation that rejected an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// [`Arena::reallocate`](crate::Arena::reallocate).
    Reallocate,
    /// [`Arena::free`](crate::Arena::free).
    Free,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reallocate => write!(f, "reallocate"),
            Self::Free => write!(f, "free"),
        }
    }
}

/// Errors that can occur during arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The address is not a live block of this arena: it was never issued
    /// here, was already freed, or was reallocated away.
    ///
    /// This is a caller bug, not a runtime condition. Outside the `try_*`
    /// entry points it is escalated by the arena's
    /// [`MisusePolicy`](crate::MisusePolicy) and must never be ignored.
    NotOwned {
        /// The operation that received the address.
        operation: Operation,
        /// The offending address.
        address: usize,
    },
    /// The underlying allocator could not satisfy the request.
    OutOfMemory {
        /// Number of bytes requested (after zero-size rounding).
        size: usize,
        /// Effective alignment of the request.
        align: usize,
    },
    /// The requested alignment is not a power of two.
    InvalidAlignment {
        /// The rejected alignment.
        align: u32,
    },
    /// The size, rounded up to the alignment, does not fit in `isize`.
    SizeOverflow {
        /// Number of bytes requested.
        size: u32,
        /// Effective alignment of the request.
        align: u32,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOwned { operation, address } => {
                write!(f, "{operation}: address {address:#x} is not owned by this arena")
            }
            Self::OutOfMemory { size, align } => {
                write!(f, "out of memory: {size} bytes with alignment {align}")
            }
            Self::InvalidAlignment { align } => {
                write!(f, "invalid alignment {align}: must be a power of two")
            }
            Self::SizeOverflow { size, align } => {
                write!(f, "size {size} with alignment {align} overflows isize")
            }
        }
    }
}

impl Error for ArenaError {}
