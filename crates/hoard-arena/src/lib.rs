//! Tracked arena allocation.
//!
//! An [`Arena`] hands out raw memory blocks and records every address it
//! returns. Blocks can be resized or released individually; whatever is
//! still outstanding when the arena is dropped is released automatically.
//! This crate is one of two that may contain `unsafe` code (along with
//! `hoard-ffi`).
//!
//! # Architecture
//!
//! ```text
//! Arena<A: RawAllocator>
//! ├── IndexMap<NonNull<u8>, Layout>  (live blocks, keyed by address)
//! ├── A                              (allocator capability, SystemAllocator by default)
//! └── ArenaConfig                    (minimum alignment, misuse policy)
//! ```
//!
//! # Ownership checks
//!
//! [`Arena::reallocate`] and [`Arena::free`] only accept addresses that are
//! currently live in the same arena. Anything else is a caller bug and is
//! escalated according to the arena's [`MisusePolicy`]: a panic by
//! default, a process abort, or a logged [`ArenaError::NotOwned`].
//!
//! # Threading
//!
//! An arena is `Send` but not `Sync`. It does no internal locking; callers
//! that share one arena across threads must wrap it in their own mutex.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod alloc;
pub mod arena;
pub mod config;
pub mod error;

// Public re-exports for the primary API surface.
pub use alloc::{RawAllocator, SystemAllocator};
pub use arena::Arena;
pub use config::{ArenaConfig, MisusePolicy};
pub use error::{ArenaError, Operation};
