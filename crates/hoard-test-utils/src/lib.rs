//! Instrumented allocators for testing hoard arenas.
//!
//! [`TrackingAllocator`] records every allocate, resize and release it
//! forwards to the system allocator, so tests can assert exactly which
//! blocks an arena released and when. [`FailingAllocator`] succeeds for a
//! fixed budget of requests and then reports exhaustion.
//!
//! Both are cheap to clone; clones share state, so keep one clone outside
//! the arena for inspection.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::alloc::Layout;
use std::collections::HashSet;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hoard_arena::{RawAllocator, SystemAllocator};

/// One call observed by a [`TrackingAllocator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocEvent {
    Allocate { addr: usize, size: usize, align: usize },
    Resize { from: usize, to: usize, size: usize },
    Release { addr: usize, size: usize },
}

#[derive(Default)]
struct Ledger {
    events: Vec<AllocEvent>,
    live: HashSet<usize>,
}

/// System allocator wrapper that logs every call.
#[derive(Clone, Default)]
pub struct TrackingAllocator {
    ledger: Arc<Mutex<Ledger>>,
}

impl TrackingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every event so far, in call order.
    pub fn events(&self) -> Vec<AllocEvent> {
        self.ledger().events.clone()
    }

    /// Addresses passed to `release`, in call order.
    pub fn releases(&self) -> Vec<usize> {
        self.ledger()
            .events
            .iter()
            .filter_map(|e| match e {
                AllocEvent::Release { addr, .. } => Some(*addr),
                _ => None,
            })
            .collect()
    }

    /// Number of `allocate` calls that succeeded.
    pub fn allocations(&self) -> usize {
        self.ledger()
            .events
            .iter()
            .filter(|e| matches!(e, AllocEvent::Allocate { .. }))
            .count()
    }

    /// Blocks handed out and not yet released.
    pub fn outstanding(&self) -> usize {
        self.ledger().live.len()
    }

    /// Forget recorded events. Live-block accounting is kept.
    pub fn clear_events(&self) {
        self.ledger().events.clear();
    }
}

#[allow(unsafe_code)]
impl RawAllocator for TrackingAllocator {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        // SAFETY: forwarded contract.
        let ptr = unsafe { SystemAllocator.allocate(layout) }?;
        let addr = ptr.as_ptr() as usize;
        let mut ledger = self.ledger();
        ledger.events.push(AllocEvent::Allocate {
            addr,
            size: layout.size(),
            align: layout.align(),
        });
        ledger.live.insert(addr);
        Some(ptr)
    }

    unsafe fn resize(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded contract.
        let new_ptr = unsafe { SystemAllocator.resize(ptr, layout, new_size) }?;
        let (from, to) = (ptr.as_ptr() as usize, new_ptr.as_ptr() as usize);
        let mut ledger = self.ledger();
        ledger.events.push(AllocEvent::Resize {
            from,
            to,
            size: new_size,
        });
        ledger.live.remove(&from);
        ledger.live.insert(to);
        Some(new_ptr)
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        let addr = ptr.as_ptr() as usize;
        {
            let mut ledger = self.ledger();
            ledger.events.push(AllocEvent::Release {
                addr,
                size: layout.size(),
            });
            ledger.live.remove(&addr);
        }
        // SAFETY: forwarded contract.
        unsafe { SystemAllocator.release(ptr, layout) }
    }
}

/// System allocator wrapper that fails once its budget is spent.
///
/// Each successful `allocate` or `resize` consumes one unit. Releases are
/// always honoured.
#[derive(Clone)]
pub struct FailingAllocator {
    budget: Arc<AtomicUsize>,
}

impl FailingAllocator {
    /// Allow `budget` successful requests before failing.
    pub fn new(budget: usize) -> Self {
        Self {
            budget: Arc::new(AtomicUsize::new(budget)),
        }
    }

    /// Replace the remaining budget.
    pub fn set_budget(&self, budget: usize) {
        self.budget.store(budget, Ordering::SeqCst);
    }

    /// Requests still allowed.
    pub fn remaining(&self) -> usize {
        self.budget.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.budget
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| b.checked_sub(1))
            .is_ok()
    }
}

#[allow(unsafe_code)]
impl RawAllocator for FailingAllocator {
    unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if !self.take() {
            return None;
        }
        // SAFETY: forwarded contract.
        unsafe { SystemAllocator.allocate(layout) }
    }

    unsafe fn resize(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if !self.take() {
            return None;
        }
        // SAFETY: forwarded contract.
        unsafe { SystemAllocator.resize(ptr, layout, new_size) }
    }

    unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { SystemAllocator.release(ptr, layout) }
    }
}
