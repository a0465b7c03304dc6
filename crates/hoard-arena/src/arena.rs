//! The tracked arena.
//!
//! Every block handed out by an [`Arena`] is recorded together with the
//! [`Layout`] it was allocated with. Reallocate and free validate the
//! address against that record; dropping the arena releases whatever is
//! still recorded.

use std::alloc::Layout;
use std::fmt;
use std::ptr::{self, NonNull};

use indexmap::IndexMap;
use tracing::{debug, error, trace};

use crate::alloc::{RawAllocator, SystemAllocator};
use crate::config::{ArenaConfig, MisusePolicy};
use crate::error::{ArenaError, Operation};

/// Allocator that owns every block it hands out.
///
/// Blocks are addressed by raw pointer. Passing an address that is not a
/// live block of this arena to [`reallocate`](Arena::reallocate) or
/// [`free`](Arena::free) is a caller bug and is escalated according to
/// [`ArenaConfig::misuse`].
///
/// Alignment requests are honoured: the effective alignment of a block is
/// the larger of the requested alignment and [`ArenaConfig::min_align`].
/// A request of zero bytes still yields a distinct one-byte block.
pub struct Arena<A: RawAllocator = SystemAllocator> {
    /// Live blocks and the layout each was obtained with.
    blocks: IndexMap<NonNull<u8>, Layout>,
    /// Sum of `Layout::size` over `blocks`.
    live_bytes: usize,
    allocator: A,
    config: ArenaConfig,
}

// SAFETY: the arena exclusively owns every block it tracks, like a `Box`.
// Raw pointers are only keys; nothing is shared with other threads unless
// the allocator itself is shared, which the `A: Send` bound covers.
#[allow(unsafe_code)]
unsafe impl<A: RawAllocator + Send> Send for Arena<A> {}

impl Arena<SystemAllocator> {
    /// Create an empty arena over the global allocator with default config.
    pub fn new() -> Self {
        Self::from_parts(SystemAllocator, ArenaConfig::default())
    }

    /// Create an empty arena over the global allocator.
    pub fn with_config(config: ArenaConfig) -> Result<Self, ArenaError> {
        Self::with_allocator(SystemAllocator, config)
    }
}

impl Default for Arena<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: RawAllocator> Arena<A> {
    /// Create an empty arena drawing memory from `allocator`.
    ///
    /// Fails if `config` does not validate.
    pub fn with_allocator(allocator: A, config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::from_parts(allocator, config))
    }

    /// `config` must already be valid.
    fn from_parts(allocator: A, config: ArenaConfig) -> Self {
        debug!(
            min_align = config.min_align,
            misuse = ?config.misuse,
            "arena created"
        );
        Self {
            blocks: IndexMap::new(),
            live_bytes: 0,
            allocator,
            config,
        }
    }

    /// Allocate a block of at least `size` bytes aligned to at least `align`.
    ///
    /// `align` of zero means no constraint beyond the configured floor.
    /// The returned address is recorded as owned by this arena.
    #[allow(unsafe_code)]
    pub fn allocate(&mut self, size: u32, align: u32) -> Result<NonNull<u8>, ArenaError> {
        let layout = self.layout_for(size, align)?;
        // SAFETY: layout_for never yields a zero-sized layout.
        let ptr = unsafe { self.allocator.allocate(layout) }.ok_or(ArenaError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        })?;
        self.track(ptr, layout);
        trace!(
            size = layout.size(),
            align = layout.align(),
            addr = ?ptr,
            "allocated block"
        );
        Ok(ptr)
    }

    /// Resize a block owned by this arena.
    ///
    /// Contents are preserved up to the lesser of the old and new sizes.
    /// The old address stops being owned and the returned one (which may be
    /// equal) starts. If the allocator fails, the old block stays owned and
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is not owned and the misuse policy is
    /// [`MisusePolicy::Panic`]. Aborts the process under
    /// [`MisusePolicy::Abort`].
    pub fn reallocate(
        &mut self,
        ptr: *mut u8,
        size: u32,
        align: u32,
    ) -> Result<NonNull<u8>, ArenaError> {
        self.try_reallocate(ptr, size, align)
            .map_err(|err| self.escalate(err))
    }

    /// [`reallocate`](Arena::reallocate) without misuse escalation.
    ///
    /// An unowned `ptr` always yields `Err(ArenaError::NotOwned)`.
    #[allow(unsafe_code)]
    pub fn try_reallocate(
        &mut self,
        ptr: *mut u8,
        size: u32,
        align: u32,
    ) -> Result<NonNull<u8>, ArenaError> {
        let (old_ptr, old_layout) = self.lookup(ptr, Operation::Reallocate)?;
        let new_layout = self.layout_for(size, align)?;
        let oom = ArenaError::OutOfMemory {
            size: new_layout.size(),
            align: new_layout.align(),
        };

        let resized = if new_layout.align() == old_layout.align() {
            // SAFETY: old_ptr is live in this arena with old_layout, and
            // layout_for validated the new size against the same alignment.
            unsafe { self.allocator.resize(old_ptr, old_layout, new_layout.size()) }
        } else {
            self.move_block(old_ptr, old_layout, new_layout)
        };
        let new_ptr = resized.ok_or(oom)?;

        if new_ptr != old_ptr {
            self.assert_untracked(new_ptr);
        }
        self.untrack(old_ptr);
        self.track(new_ptr, new_layout);
        trace!(
            old = ?old_ptr,
            new = ?new_ptr,
            old_size = old_layout.size(),
            new_size = new_layout.size(),
            "reallocated block"
        );
        Ok(new_ptr)
    }

    /// Release a block owned by this arena.
    ///
    /// The address must not be used again afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is not owned and the misuse policy is
    /// [`MisusePolicy::Panic`]. Aborts the process under
    /// [`MisusePolicy::Abort`].
    pub fn free(&mut self, ptr: *mut u8) -> Result<(), ArenaError> {
        self.try_free(ptr).map_err(|err| self.escalate(err))
    }

    /// [`free`](Arena::free) without misuse escalation.
    ///
    /// An unowned `ptr` always yields `Err(ArenaError::NotOwned)`.
    #[allow(unsafe_code)]
    pub fn try_free(&mut self, ptr: *mut u8) -> Result<(), ArenaError> {
        let (ptr, layout) = self.lookup(ptr, Operation::Free)?;
        self.untrack(ptr);
        // SAFETY: ptr was live in this arena with this layout and is now
        // removed from the record, so it is released exactly once.
        unsafe { self.allocator.release(ptr, layout) };
        trace!(size = layout.size(), addr = ?ptr, "freed block");
        Ok(())
    }

    /// Whether `ptr` is a live block of this arena.
    pub fn owns(&self, ptr: *const u8) -> bool {
        NonNull::new(ptr.cast_mut()).is_some_and(|p| self.blocks.contains_key(&p))
    }

    /// The layout a live block was allocated with.
    pub fn layout_of(&self, ptr: *const u8) -> Option<Layout> {
        NonNull::new(ptr.cast_mut()).and_then(|p| self.blocks.get(&p).copied())
    }

    /// Release every live block, leaving the arena empty but usable.
    ///
    /// Returns the number of blocks released. Order is unspecified.
    #[allow(unsafe_code)]
    pub fn release_all(&mut self) -> usize {
        let count = self.blocks.len();
        for (ptr, layout) in self.blocks.drain(..) {
            // SAFETY: every recorded block is live with its recorded layout,
            // and draining removes it from the record.
            unsafe { self.allocator.release(ptr, layout) };
        }
        self.live_bytes = 0;
        if count > 0 {
            debug!(count, "released outstanding blocks");
        }
        count
    }

    /// Number of live blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the arena has no live blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total size of live blocks in bytes.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes
    }

    /// The arena's configuration.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// The underlying allocator.
    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    fn layout_for(&self, size: u32, align: u32) -> Result<Layout, ArenaError> {
        if align != 0 && !align.is_power_of_two() {
            return Err(ArenaError::InvalidAlignment { align });
        }
        let align = align.max(self.config.min_align);
        Layout::from_size_align(size.max(1) as usize, align as usize)
            .map_err(|_| ArenaError::SizeOverflow { size, align })
    }

    fn lookup(&self, ptr: *mut u8, operation: Operation) -> Result<(NonNull<u8>, Layout), ArenaError> {
        NonNull::new(ptr)
            .and_then(|p| self.blocks.get(&p).map(|&layout| (p, layout)))
            .ok_or(ArenaError::NotOwned {
                operation,
                address: ptr as usize,
            })
    }

    /// A `RawAllocator` handing out a live address twice has broken its
    /// contract; the record is left untouched before panicking.
    fn assert_untracked(&self, ptr: NonNull<u8>) {
        assert!(
            !self.blocks.contains_key(&ptr),
            "allocator returned live address {ptr:p} a second time"
        );
    }

    fn track(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.assert_untracked(ptr);
        self.blocks.insert(ptr, layout);
        self.live_bytes += layout.size();
    }

    fn untrack(&mut self, ptr: NonNull<u8>) {
        if let Some(layout) = self.blocks.swap_remove(&ptr) {
            self.live_bytes -= layout.size();
        }
    }

    /// Allocate a block with `new_layout`, copy the common prefix, and
    /// release the old block. Used when the alignment changes.
    #[allow(unsafe_code)]
    fn move_block(
        &self,
        old_ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        // SAFETY: new_layout is never zero-sized.
        let new_ptr = unsafe { self.allocator.allocate(new_layout) }?;
        let len = old_layout.size().min(new_layout.size());
        // SAFETY: both blocks are live, distinct and at least `len` bytes;
        // old_ptr is released exactly once and untracked by the caller.
        unsafe {
            ptr::copy_nonoverlapping(old_ptr.as_ptr(), new_ptr.as_ptr(), len);
            self.allocator.release(old_ptr, old_layout);
        }
        Some(new_ptr)
    }

    fn escalate(&self, err: ArenaError) -> ArenaError {
        if let ArenaError::NotOwned { .. } = err {
            error!(%err, policy = ?self.config.misuse, "arena misuse");
            match self.config.misuse {
                MisusePolicy::Panic => panic!("{err}"),
                MisusePolicy::Abort => {
                    eprintln!("hoard-arena: fatal: {err}");
                    std::process::abort();
                }
                MisusePolicy::Report => {}
            }
        }
        err
    }
}

impl<A: RawAllocator> Drop for Arena<A> {
    fn drop(&mut self) {
        self.release_all();
    }
}

impl<A: RawAllocator> fmt::Debug for Arena<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("live_blocks", &self.blocks.len())
            .field("live_bytes", &self.live_bytes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Wraps the system allocator, records released addresses, and can be
    /// told to fail.
    #[derive(Clone, Default)]
    struct Recording {
        released: Rc<RefCell<Vec<usize>>>,
        fail: Rc<Cell<bool>>,
    }

    impl RawAllocator for Recording {
        unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            if self.fail.get() {
                return None;
            }
            unsafe { SystemAllocator.allocate(layout) }
        }

        unsafe fn resize(
            &self,
            ptr: NonNull<u8>,
            layout: Layout,
            new_size: usize,
        ) -> Option<NonNull<u8>> {
            if self.fail.get() {
                return None;
            }
            unsafe { SystemAllocator.resize(ptr, layout, new_size) }
        }

        unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
            self.released.borrow_mut().push(ptr.as_ptr() as usize);
            unsafe { SystemAllocator.release(ptr, layout) }
        }
    }

    fn recording_arena(misuse: MisusePolicy) -> (Arena<Recording>, Recording) {
        let alloc = Recording::default();
        let config = ArenaConfig::new().with_misuse(misuse);
        let arena = Arena::with_allocator(alloc.clone(), config).unwrap();
        (arena, alloc)
    }

    fn write_bytes(ptr: NonNull<u8>, bytes: &[u8]) {
        unsafe { ptr.as_ptr().copy_from_nonoverlapping(bytes.as_ptr(), bytes.len()) };
    }

    fn read_bytes(ptr: NonNull<u8>, len: usize) -> Vec<u8> {
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), len) };
        bytes.to_vec()
    }

    #[test]
    fn new_arena_is_empty() {
        let arena = Arena::new();
        assert!(arena.is_empty());
        assert_eq!(arena.len(), 0);
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn allocations_are_distinct_and_owned() {
        let mut arena = Arena::new();
        let ptrs: Vec<_> = (0..64).map(|i| arena.allocate(i * 3, 8).unwrap()).collect();
        for p in &ptrs {
            assert!(arena.owns(p.as_ptr()));
        }
        let distinct: std::collections::HashSet<_> = ptrs.iter().collect();
        assert_eq!(distinct.len(), ptrs.len());
        assert_eq!(arena.len(), 64);
    }

    #[test]
    fn zero_size_allocations_are_distinct() {
        let mut arena = Arena::new();
        let a = arena.allocate(0, 0).unwrap();
        let b = arena.allocate(0, 0).unwrap();
        assert_ne!(a, b);
        assert_eq!(arena.layout_of(a.as_ptr()).unwrap().size(), 1);
    }

    #[test]
    fn alignment_is_enforced() {
        let mut arena = Arena::new();
        for shift in 0..13 {
            let align = 1u32 << shift;
            let p = arena.allocate(3, align).unwrap();
            assert_eq!(p.as_ptr() as usize % align as usize, 0, "align {align}");
        }
    }

    #[test]
    fn min_align_floor_applies_to_small_requests() {
        let config = ArenaConfig::new().with_min_align(64);
        let mut arena = Arena::with_config(config).unwrap();
        let p = arena.allocate(1, 1).unwrap();
        assert_eq!(p.as_ptr() as usize % 64, 0);
        assert_eq!(arena.layout_of(p.as_ptr()).unwrap().align(), 64);
        assert_eq!(arena.config().min_align, 64);
        assert_eq!(arena.config().misuse, MisusePolicy::Panic);
    }

    #[test]
    fn non_power_of_two_alignment_rejected() {
        let mut arena = Arena::new();
        assert_eq!(
            arena.allocate(8, 12),
            Err(ArenaError::InvalidAlignment { align: 12 })
        );
        assert!(arena.is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let err = Arena::with_config(ArenaConfig::new().with_min_align(3)).unwrap_err();
        assert_eq!(err, ArenaError::InvalidAlignment { align: 3 });
    }

    #[test]
    fn free_removes_ownership() {
        let mut arena = Arena::new();
        let p = arena.allocate(16, 8).unwrap();
        arena.free(p.as_ptr()).unwrap();
        assert!(!arena.owns(p.as_ptr()));
        assert!(arena.is_empty());
        assert_eq!(arena.live_bytes(), 0);
    }

    #[test]
    fn reallocate_transfers_ownership() {
        let mut arena = Arena::new();
        let a = arena.allocate(16, 8).unwrap();
        let b = arena.reallocate(a.as_ptr(), 4096, 8).unwrap();
        assert!(arena.owns(b.as_ptr()));
        if a != b {
            assert!(!arena.owns(a.as_ptr()));
        }
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.live_bytes(), 4096);
    }

    #[test]
    fn grow_preserves_contents() {
        let mut arena = Arena::new();
        let p = arena.allocate(8, 8).unwrap();
        write_bytes(p, &[9, 8, 7, 6, 5, 4, 3, 2]);
        let q = arena.reallocate(p.as_ptr(), 1024, 8).unwrap();
        assert_eq!(read_bytes(q, 8), vec![9, 8, 7, 6, 5, 4, 3, 2]);
    }

    #[test]
    fn shrink_preserves_prefix() {
        let mut arena = Arena::new();
        let p = arena.allocate(8, 8).unwrap();
        write_bytes(p, &[1, 2, 3, 4, 5, 6, 7, 8]);
        let q = arena.reallocate(p.as_ptr(), 4, 8).unwrap();
        assert_eq!(read_bytes(q, 4), vec![1, 2, 3, 4]);
        assert_eq!(arena.layout_of(q.as_ptr()).unwrap().size(), 4);
    }

    #[test]
    fn realign_moves_block_and_keeps_contents() {
        let (mut arena, alloc) = recording_arena(MisusePolicy::Panic);
        let p = arena.allocate(16, 16).unwrap();
        write_bytes(p, &[0xAB; 16]);
        let q = arena.reallocate(p.as_ptr(), 32, 256).unwrap();
        assert_eq!(q.as_ptr() as usize % 256, 0);
        assert_eq!(read_bytes(q, 16), vec![0xAB; 16]);
        assert_eq!(alloc.released.borrow().as_slice(), &[p.as_ptr() as usize]);
        assert!(arena.owns(q.as_ptr()));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn drop_releases_outstanding_blocks_only() {
        let (mut arena, alloc) = recording_arena(MisusePolicy::Panic);
        let p1 = arena.allocate(16, 8).unwrap();
        let p2 = arena.allocate(32, 8).unwrap();
        assert!(arena.owns(p1.as_ptr()) && arena.owns(p2.as_ptr()));
        assert_ne!(p1, p2);

        arena.free(p1.as_ptr()).unwrap();
        assert!(!arena.owns(p1.as_ptr()));
        assert!(arena.owns(p2.as_ptr()));
        alloc.released.borrow_mut().clear();

        drop(arena);
        assert_eq!(alloc.released.borrow().as_slice(), &[p2.as_ptr() as usize]);
    }

    #[test]
    fn release_all_leaves_arena_usable() {
        let (mut arena, alloc) = recording_arena(MisusePolicy::Panic);
        for _ in 0..5 {
            arena.allocate(10, 0).unwrap();
        }
        assert_eq!(arena.release_all(), 5);
        assert!(arena.is_empty());
        assert_eq!(alloc.released.borrow().len(), 5);

        let p = arena.allocate(10, 0).unwrap();
        assert!(arena.owns(p.as_ptr()));
    }

    #[test]
    fn out_of_memory_is_reported_and_state_unchanged() {
        let (mut arena, alloc) = recording_arena(MisusePolicy::Panic);
        let p = arena.allocate(8, 8).unwrap();
        write_bytes(p, &[7; 8]);

        alloc.fail.set(true);
        assert!(matches!(
            arena.allocate(8, 8),
            Err(ArenaError::OutOfMemory { .. })
        ));
        assert_eq!(
            arena.reallocate(p.as_ptr(), 64, 8),
            Err(ArenaError::OutOfMemory {
                size: 64,
                align: ArenaConfig::DEFAULT_MIN_ALIGN as usize,
            })
        );
        assert!(arena.owns(p.as_ptr()));
        assert_eq!(arena.len(), 1);
        assert_eq!(read_bytes(p, 8), vec![7; 8]);
    }

    #[test]
    fn owns_rejects_null_and_foreign() {
        let mut arena = Arena::new();
        let local = 0u64;
        arena.allocate(4, 4).unwrap();
        assert!(!arena.owns(std::ptr::null()));
        assert!(!arena.owns((&local as *const u64).cast()));
    }

    #[test]
    #[should_panic(expected = "not owned by this arena")]
    fn free_of_stack_address_panics() {
        let mut arena = Arena::new();
        let mut local = 0u64;
        let _ = arena.free((&mut local as *mut u64).cast());
    }

    #[test]
    #[should_panic(expected = "free: address")]
    fn double_free_panics() {
        let mut arena = Arena::new();
        let p = arena.allocate(8, 8).unwrap();
        arena.free(p.as_ptr()).unwrap();
        let _ = arena.free(p.as_ptr());
    }

    #[test]
    #[should_panic(expected = "reallocate: address")]
    fn reallocate_of_foreign_block_panics() {
        let mut other = Arena::new();
        let foreign = other.allocate(8, 8).unwrap();
        let mut arena = Arena::new();
        let _ = arena.reallocate(foreign.as_ptr(), 16, 8);
    }

    #[test]
    fn report_policy_returns_not_owned() {
        let config = ArenaConfig::new().with_misuse(MisusePolicy::Report);
        let mut arena = Arena::with_config(config).unwrap();
        let p = arena.allocate(8, 8).unwrap();
        arena.free(p.as_ptr()).unwrap();
        assert_eq!(
            arena.free(p.as_ptr()),
            Err(ArenaError::NotOwned {
                operation: Operation::Free,
                address: p.as_ptr() as usize,
            })
        );
        assert!(matches!(
            arena.reallocate(std::ptr::null_mut(), 8, 8),
            Err(ArenaError::NotOwned {
                operation: Operation::Reallocate,
                address: 0,
            })
        ));
    }

    #[test]
    fn try_variants_never_escalate() {
        let mut arena = Arena::new();
        assert!(matches!(
            arena.try_free(std::ptr::null_mut()),
            Err(ArenaError::NotOwned { .. })
        ));
        assert!(matches!(
            arena.try_reallocate(std::ptr::null_mut(), 1, 1),
            Err(ArenaError::NotOwned { .. })
        ));
    }

    /// Resizes by handing back `target` without touching the old block.
    #[derive(Default)]
    struct Aliasing {
        target: Cell<Option<NonNull<u8>>>,
    }

    impl RawAllocator for Aliasing {
        unsafe fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            unsafe { SystemAllocator.allocate(layout) }
        }

        unsafe fn resize(&self, _: NonNull<u8>, _: Layout, _: usize) -> Option<NonNull<u8>> {
            self.target.get()
        }

        unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
            unsafe { SystemAllocator.release(ptr, layout) }
        }
    }

    #[test]
    fn aliased_address_from_allocator_leaves_record_intact() {
        let mut arena = Arena::with_allocator(Aliasing::default(), ArenaConfig::new()).unwrap();
        let a = arena.allocate(16, 0).unwrap();
        let b = arena.allocate(16, 0).unwrap();
        arena.allocator().target.set(Some(a));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            arena.try_reallocate(b.as_ptr(), 16, 0)
        }));
        let payload = result.unwrap_err();
        let message = payload.downcast_ref::<String>().unwrap();
        assert!(message.contains("a second time"), "{message}");

        assert!(arena.owns(a.as_ptr()));
        assert!(arena.owns(b.as_ptr()));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.live_bytes(), 32);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn every_constructor_logs_creation() {
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(out.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            drop(Arena::new());
            drop(Arena::default());
            drop(Arena::with_config(ArenaConfig::new()).unwrap());
        });
        let logged = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logged.matches("arena created").count(), 3, "{logged}");
    }

    #[test]
    fn arena_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Arena>();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Alloc(u32, u32),
            Realloc(usize, u32),
            Free(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u32..512, 0u32..7).prop_map(|(size, shift)| Op::Alloc(size, 1 << shift)),
                (any::<usize>(), 0u32..512).prop_map(|(i, size)| Op::Realloc(i, size)),
                any::<usize>().prop_map(Op::Free),
            ]
        }

        proptest! {
            #[test]
            fn record_matches_model(ops in proptest::collection::vec(op(), 1..64)) {
                let mut arena = Arena::new();
                let mut live: Vec<NonNull<u8>> = Vec::new();
                for op in ops {
                    match op {
                        Op::Alloc(size, align) => {
                            let p = arena.allocate(size, align).unwrap();
                            prop_assert!(!live.contains(&p));
                            live.push(p);
                        }
                        Op::Realloc(i, size) if !live.is_empty() => {
                            let old = live.swap_remove(i % live.len());
                            let new = arena.reallocate(old.as_ptr(), size, 0).unwrap();
                            prop_assert!(arena.owns(new.as_ptr()));
                            live.push(new);
                        }
                        Op::Free(i) if !live.is_empty() => {
                            let p = live.swap_remove(i % live.len());
                            arena.free(p.as_ptr()).unwrap();
                            prop_assert!(!arena.owns(p.as_ptr()));
                        }
                        _ => {}
                    }
                    prop_assert_eq!(arena.len(), live.len());
                    for p in &live {
                        prop_assert!(arena.owns(p.as_ptr()));
                    }
                }
                let expected: usize = live
                    .iter()
                    .map(|p| arena.layout_of(p.as_ptr()).unwrap().size())
                    .sum();
                prop_assert_eq!(arena.live_bytes(), expected);
            }

            #[test]
            fn shrink_keeps_prefix(data in proptest::collection::vec(any::<u8>(), 1..256), keep in 1usize..256) {
                let keep = keep.min(data.len());
                let mut arena = Arena::new();
                let p = arena.allocate(data.len() as u32, 1).unwrap();
                write_bytes(p, &data);
                let q = arena.reallocate(p.as_ptr(), keep as u32, 1).unwrap();
                prop_assert_eq!(read_bytes(q, keep), data[..keep].to_vec());
            }
        }
    }
}
