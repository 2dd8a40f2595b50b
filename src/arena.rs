use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::Result;

struct ResultSlots {
    bits: Box<[AtomicU32]>,
    errors: Box<[AtomicU64]>,
}

/// Bump region of per-block result slots. Regions are handed out front to
/// back and the whole arena is emptied with [`ScratchArena::reset`]; there
/// is no per-region release.
pub struct ScratchArena {
    slots: Arc<ResultSlots>,
    used: usize,
}

impl ScratchArena {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = ResultSlots {
            bits: (0..capacity).map(|_| AtomicU32::new(0)).collect(),
            errors: (0..capacity).map(|_| AtomicU64::new(0)).collect(),
        };
        ScratchArena {
            slots: Arc::new(slots),
            used: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.bits.len()
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.used
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Hands out `count` zeroed slots. Running out of space is an error,
    /// never a silent truncation.
    pub fn allocate(&mut self, count: usize) -> Result<SlotRegion> {
        let available = self.available();
        if count > available {
            return Err(Error::ScratchArenaExhausted {
                requested: count,
                available,
            });
        }
        let region = SlotRegion {
            slots: Arc::clone(&self.slots),
            start: self.used,
            len: count,
        };
        region.clear();
        self.used += count;
        Ok(region)
    }
}

/// A window of arena slots, shareable across worker threads. Each index
/// is written by exactly one worker per dispatch.
#[derive(Clone)]
pub struct SlotRegion {
    slots: Arc<ResultSlots>,
    start: usize,
    len: usize,
}

impl SlotRegion {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, index: usize) -> usize {
        assert!(index < self.len, "slot {} outside region of {}", index, self.len);
        self.start + index
    }

    fn clear(&self) {
        for index in 0..self.len {
            self.store(index, 0, 0);
        }
    }

    pub fn store(&self, index: usize, bits: u32, error: u64) {
        let slot = self.slot(index);
        self.slots.bits[slot].store(bits, Ordering::Relaxed);
        self.slots.errors[slot].store(error, Ordering::Relaxed);
    }

    pub fn bits(&self, index: usize) -> u32 {
        self.slots.bits[self.slot(index)].load(Ordering::Relaxed)
    }

    pub fn error(&self, index: usize) -> u64 {
        self.slots.errors[self.slot(index)].load(Ordering::Relaxed)
    }

    pub fn iter_bits(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(|index| self.bits(index))
    }

    pub fn iter_errors(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).map(|index| self.error(index))
    }
}

#[cfg(test)]
mod test {
    use super::ScratchArena;
    use crate::error::Error;

    #[test]
    fn allocate_until_exhausted() {
        let mut arena = ScratchArena::with_capacity(10);
        let first = arena.allocate(6).unwrap();
        assert_eq!(first.len(), 6);
        assert_eq!(arena.available(), 4);
        match arena.allocate(5) {
            Err(Error::ScratchArenaExhausted {
                requested: 5,
                available: 4,
            }) => {}
            _ => panic!("overflow of the arena was not reported"),
        }
    }

    #[test]
    fn reset_reuses_and_clears_slots() {
        let mut arena = ScratchArena::with_capacity(4);
        let region = arena.allocate(4).unwrap();
        region.store(3, 17, 99);
        assert_eq!(region.bits(3), 17);
        assert_eq!(region.error(3), 99);
        arena.reset();
        let region = arena.allocate(4).unwrap();
        assert_eq!(region.bits(3), 0);
        assert_eq!(region.iter_errors().sum::<u64>(), 0);
    }

    #[test]
    fn regions_do_not_overlap() {
        let mut arena = ScratchArena::with_capacity(4);
        let first = arena.allocate(2).unwrap();
        let second = arena.allocate(2).unwrap();
        first.store(0, 1, 1);
        second.store(0, 2, 2);
        assert_eq!(first.bits(0), 1);
        assert_eq!(second.bits(0), 2);
    }

    #[test]
    #[should_panic]
    fn index_outside_region() {
        let mut arena = ScratchArena::with_capacity(4);
        let region = arena.allocate(2).unwrap();
        region.store(2, 0, 0);
    }
}
