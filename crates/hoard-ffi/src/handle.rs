//! Slot+generation table backing the opaque `u64` arena handles.
//!
//! A handle packs a slot index (upper 32 bits) and the slot's generation at
//! insertion time (lower 32 bits). Removing a value bumps the generation,
//! so a destroyed handle no longer matches its slot: lookups return `None`
//! and the C caller gets `InvalidHandle` instead of touching a dead arena.

fn pack(slot: u32, generation: u32) -> u64 {
    (u64::from(slot) << 32) | u64::from(generation)
}

fn unpack(handle: u64) -> (u32, u32) {
    ((handle >> 32) as u32, handle as u32)
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Table mapping `u64` handles to owned values, with slot reuse.
pub(crate) struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
    live: usize,
}

impl<T> HandleTable<T> {
    /// An empty table, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            live: 0,
        }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        self.live += 1;
        match self.vacant.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                pack(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                pack(index, 0)
            }
        }
    }

    /// The value behind `handle`, if the handle is current.
    pub fn get(&self, handle: u64) -> Option<&T> {
        let (index, generation) = unpack(handle);
        self.slots
            .get(index as usize)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Take the value behind `handle` out of the table.
    ///
    /// Stale or unknown handles yield `None`, so a second destroy is
    /// harmless. A slot whose generation would wrap to zero is retired
    /// rather than recycled, so no old handle can ever match it again.
    pub fn remove(&mut self, handle: u64) -> Option<T> {
        let (index, generation) = unpack(handle);
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if slot.generation != 0 {
            self.vacant.push(index);
        }
        self.live -= 1;
        Some(value)
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.live
    }
}
