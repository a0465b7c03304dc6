//! Arena lifecycle and allocation FFI: create, destroy, alloc, realloc,
//! free, owns, stats.
//!
//! Arenas live in a process-wide handle table as `Arc<Mutex<Arena>>`. The
//! table lock is held only for handle lookup; each call then locks its own
//! arena. The per-arena mutex exists so the table can be shared across
//! threads; it is not a promise that one arena may be driven from several
//! threads without the caller's own ordering.

use std::ffi::c_void;
use std::ptr;
use std::sync::{Arc, Mutex};

use hoard_arena::{Arena, ArenaConfig};
use tracing::debug;

use crate::handle::HandleTable;
use crate::status::HoardStatus;
use crate::types::{HoardArenaStats, HoardMisusePolicy};

type ArenaArc = Arc<Mutex<Arena>>;

static ARENAS: Mutex<HandleTable<ArenaArc>> = Mutex::new(HandleTable::new());

/// Clone the Arc for an arena handle, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the table mutex is poisoned.
fn get_arena(handle: u64) -> Option<ArenaArc> {
    ARENAS.lock().ok()?.get(handle).cloned()
}

/// Create an arena that aborts the process on ownership misuse.
///
/// On success, writes the arena handle to `handle_out` and returns
/// `HOARD_STATUS_OK`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_create(handle_out: *mut u64) -> i32 {
    hoard_arena_create_with_policy(HoardMisusePolicy::Abort as i32, 0, handle_out)
}

/// Create an arena with an explicit misuse policy and alignment floor.
///
/// `policy` is a `HoardMisusePolicy` value. `min_align` of zero selects the
/// default floor; otherwise it must be a power of two.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_create_with_policy(
    policy: i32,
    min_align: u32,
    handle_out: *mut u64,
) -> i32 {
    ffi_guard!({
        if handle_out.is_null() {
            return HoardStatus::InvalidArgument as i32;
        }
        let policy = match HoardMisusePolicy::try_from(policy) {
            Ok(p) => p,
            Err(status) => return status as i32,
        };

        let mut config = ArenaConfig::new().with_misuse(policy.into());
        if min_align != 0 {
            config = config.with_min_align(min_align);
        }
        let arena = match Arena::with_config(config) {
            Ok(a) => a,
            Err(e) => return HoardStatus::from(&e) as i32,
        };

        let mut arenas = ffi_lock!(ARENAS);
        let handle = arenas.insert(Arc::new(Mutex::new(arena)));
        debug!(handle, live_arenas = arenas.len(), "arena handle created");
        drop(arenas);

        // SAFETY: handle_out is non-null and valid per caller contract.
        unsafe { *handle_out = handle };
        HoardStatus::Ok as i32
    })
}

/// Destroy an arena, releasing every block it still owns.
///
/// The handle is invalid afterwards; destroying it again returns
/// `HOARD_STATUS_INVALID_HANDLE`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_destroy(handle: u64) -> i32 {
    ffi_guard!({
        let mut arenas = ffi_lock!(ARENAS);
        let removed = arenas.remove(handle);
        let live_arenas = arenas.len();
        // Release the table before the arena drops its blocks.
        drop(arenas);
        match removed {
            Some(arena) => {
                drop(arena);
                debug!(handle, live_arenas, "arena handle destroyed");
                HoardStatus::Ok as i32
            }
            None => HoardStatus::InvalidHandle as i32,
        }
    })
}

/// Allocate `size` bytes aligned to at least `align` from an arena.
///
/// On success writes the block address to `ptr_out`. On failure writes
/// null (if `ptr_out` is non-null) and returns the error status.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_alloc(
    handle: u64,
    size: u32,
    align: u32,
    ptr_out: *mut *mut c_void,
) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return HoardStatus::InvalidArgument as i32;
        }
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = ptr::null_mut() };

        let arena_arc = match get_arena(handle) {
            Some(arc) => arc,
            None => return HoardStatus::InvalidHandle as i32,
        };
        let mut arena = ffi_lock!(arena_arc);

        match arena.allocate(size, align) {
            Ok(block) => {
                // SAFETY: as above.
                unsafe { *ptr_out = block.as_ptr().cast() };
                HoardStatus::Ok as i32
            }
            Err(e) => HoardStatus::from(&e) as i32,
        }
    })
}

/// Resize a block owned by the arena.
///
/// On success writes the (possibly moved) address to `ptr_out`; `ptr` must
/// not be used again unless it equals the new address. On failure `ptr`
/// stays valid and owned, and null is written to `ptr_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_realloc(
    handle: u64,
    ptr: *mut c_void,
    size: u32,
    align: u32,
    ptr_out: *mut *mut c_void,
) -> i32 {
    ffi_guard!({
        if ptr_out.is_null() {
            return HoardStatus::InvalidArgument as i32;
        }
        // SAFETY: ptr_out is non-null and valid per caller contract.
        unsafe { *ptr_out = ptr::null_mut() };

        let arena_arc = match get_arena(handle) {
            Some(arc) => arc,
            None => return HoardStatus::InvalidHandle as i32,
        };
        let mut arena = ffi_lock!(arena_arc);

        match arena.reallocate(ptr.cast(), size, align) {
            Ok(block) => {
                // SAFETY: as above.
                unsafe { *ptr_out = block.as_ptr().cast() };
                HoardStatus::Ok as i32
            }
            Err(e) => HoardStatus::from(&e) as i32,
        }
    })
}

/// Release a block owned by the arena.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_free(handle: u64, ptr: *mut c_void) -> i32 {
    ffi_guard!({
        let arena_arc = match get_arena(handle) {
            Some(arc) => arc,
            None => return HoardStatus::InvalidHandle as i32,
        };
        let mut arena = ffi_lock!(arena_arc);

        match arena.free(ptr.cast()) {
            Ok(()) => HoardStatus::Ok as i32,
            Err(e) => HoardStatus::from(&e) as i32,
        }
    })
}

/// Query whether `ptr` is a live block of the arena.
///
/// Writes 1 or 0 to `owns_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_owns(handle: u64, ptr: *const c_void, owns_out: *mut u8) -> i32 {
    ffi_guard!({
        if owns_out.is_null() {
            return HoardStatus::InvalidArgument as i32;
        }
        let arena_arc = match get_arena(handle) {
            Some(arc) => arc,
            None => return HoardStatus::InvalidHandle as i32,
        };
        let arena = ffi_lock!(arena_arc);
        let owns = arena.owns(ptr.cast());

        // SAFETY: owns_out is non-null and valid per caller contract.
        unsafe { *owns_out = u8::from(owns) };
        HoardStatus::Ok as i32
    })
}

/// Write the arena's live block count and byte total to `stats_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn hoard_arena_stats(handle: u64, stats_out: *mut HoardArenaStats) -> i32 {
    ffi_guard!({
        if stats_out.is_null() {
            return HoardStatus::InvalidArgument as i32;
        }
        let arena_arc = match get_arena(handle) {
            Some(arc) => arc,
            None => return HoardStatus::InvalidHandle as i32,
        };
        let arena = ffi_lock!(arena_arc);
        let stats = HoardArenaStats {
            live_blocks: arena.len() as u64,
            live_bytes: arena.live_bytes() as u64,
        };

        // SAFETY: stats_out is non-null and valid per caller contract.
        unsafe { *stats_out = stats };
        HoardStatus::Ok as i32
    })
}
