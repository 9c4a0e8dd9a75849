//! Lock-free bump-pointer space
//!
//! One contiguous region `[bottom, end)` with an atomic cursor `top`.
//! Mutators race on `top` with a CAS loop; every successful allocation gets
//! a disjoint slice of the region. Once `top` reaches `end` every further
//! request fails until [`BumpSpace::reset`]. Failure is the signal to run a
//! collection, never an error.

use std::fmt;
use std::ptr::NonNull;

#[cfg(loom)]
use loom::sync::atomic::{AtomicUsize, Ordering};
#[cfg(not(loom))]
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use crate::region::MemRegion;
use crate::{GcError, GcResult, HEAP_WORD_SIZE};

/// Role a space plays inside the young generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpaceKind {
    /// Allocation area for new objects
    Eden,
    /// Survivor space holding the objects that survived the last scavenge
    From,
    /// Empty survivor space receiving copies during the next scavenge
    To,
}

impl SpaceKind {
    pub fn name(self) -> &'static str {
        match self {
            SpaceKind::Eden => "eden",
            SpaceKind::From => "from",
            SpaceKind::To => "to",
        }
    }
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Contiguous bump-allocation region
pub struct BumpSpace {
    bottom: usize,
    end: usize,
    top: AtomicUsize,
}

impl BumpSpace {
    /// Create an empty space covering `region`
    pub fn new(region: MemRegion) -> Self {
        Self {
            bottom: region.start(),
            end: region.end(),
            top: AtomicUsize::new(region.start()),
        }
    }

    /// Allocate `word_size` heap words
    ///
    /// Returns `None` when the space cannot fit the request (or when
    /// `word_size` is zero). Never blocks and never grows the space.
    pub fn allocate(&self, word_size: usize) -> Option<NonNull<u8>> {
        if word_size == 0 {
            return None;
        }
        let bytes = word_size.checked_mul(HEAP_WORD_SIZE)?;

        let mut current = self.top.load(Ordering::Relaxed);
        loop {
            let new_top = current.checked_add(bytes)?;
            if new_top > self.end {
                return None;
            }
            // CAS失败说明其他线程抢先推进了top，用实际值重试
            match self.top.compare_exchange_weak(
                current,
                new_top,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return NonNull::new(std::ptr::with_exposed_provenance_mut(current)),
                Err(actual) => current = actual,
            }
        }
    }

    /// Empty the space: `top = bottom`
    ///
    /// Only valid while no thread is allocating.
    pub fn reset(&self) {
        self.top.store(self.bottom, Ordering::Release);
    }

    /// Move the space to `region` and empty it
    pub fn set_bounds(&mut self, region: MemRegion) {
        self.bottom = region.start();
        self.end = region.end();
        self.top.store(region.start(), Ordering::Release);
    }

    /// Move the space to `region`, keeping the allocated prefix
    ///
    /// # Errors
    ///
    /// Fails without touching the space if `region` does not start at the
    /// current bottom or would cut into `[bottom, top)`.
    pub fn resize_keeping_top(&mut self, region: MemRegion) -> GcResult<()> {
        let top = self.top();
        if region.start() != self.bottom || region.end() < top {
            return Err(GcError::layout_violation(format!(
                "{region} would cut live data in [{:#x}, {top:#x})",
                self.bottom
            )));
        }
        self.end = region.end();
        Ok(())
    }

    /// Set the cursor after a compaction
    ///
    /// # Errors
    ///
    /// Fails if `top` lies outside `[bottom, end]`.
    pub fn set_top(&mut self, top: usize) -> GcResult<()> {
        if top < self.bottom || top > self.end {
            return Err(GcError::invalid_range(self.bottom, top));
        }
        self.top.store(top, Ordering::Release);
        Ok(())
    }

    pub fn bottom(&self) -> usize {
        self.bottom
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn top(&self) -> usize {
        self.top.load(Ordering::Acquire)
    }

    /// Whole region `[bottom, end)`
    pub fn region(&self) -> MemRegion {
        MemRegion::from_bounds(self.bottom, self.end)
    }

    /// Allocated prefix `[bottom, top)`
    pub fn used_region(&self) -> MemRegion {
        MemRegion::from_bounds(self.bottom, self.top())
    }

    pub fn contains(&self, addr: usize) -> bool {
        self.bottom <= addr && addr < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.top() == self.bottom
    }

    pub fn capacity_in_bytes(&self) -> usize {
        self.end - self.bottom
    }

    pub fn used_in_bytes(&self) -> usize {
        self.top() - self.bottom
    }

    pub fn free_in_bytes(&self) -> usize {
        self.end - self.top()
    }

    pub fn capacity_in_words(&self) -> usize {
        self.capacity_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn used_in_words(&self) -> usize {
        self.used_in_bytes() / HEAP_WORD_SIZE
    }

    pub fn free_in_words(&self) -> usize {
        self.free_in_bytes() / HEAP_WORD_SIZE
    }
}

impl fmt::Debug for BumpSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BumpSpace [{:#x}, {:#x}, {:#x})",
            self.bottom,
            self.top(),
            self.end
        )
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    fn space(bytes: usize) -> BumpSpace {
        BumpSpace::new(MemRegion::with_size(0x10_0000, bytes).unwrap())
    }

    #[test]
    fn test_allocate_until_exhausted() {
        let s = space(4 * HEAP_WORD_SIZE);
        let a = s.allocate(1).unwrap();
        let b = s.allocate(2).unwrap();
        assert_eq!(a.as_ptr().addr(), 0x10_0000);
        assert_eq!(b.as_ptr().addr(), 0x10_0000 + HEAP_WORD_SIZE);
        assert_eq!(s.used_in_words(), 3);

        assert!(s.allocate(2).is_none());
        assert!(s.allocate(1).is_some());
        assert_eq!(s.free_in_bytes(), 0);
        assert!(s.allocate(1).is_none());

        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.free_in_words(), 4);
    }

    #[test]
    fn test_rejects_zero_and_overflowing_requests() {
        let s = space(HEAP_WORD_SIZE);
        assert!(s.allocate(0).is_none());
        assert!(s.allocate(usize::MAX).is_none());
        assert!(s.is_empty());
    }

    #[test]
    fn test_resize_keeping_top() {
        let mut s = space(8 * HEAP_WORD_SIZE);
        s.allocate(3).unwrap();
        let bottom = s.bottom();

        let cut = MemRegion::with_size(bottom, 2 * HEAP_WORD_SIZE).unwrap();
        assert!(s.resize_keeping_top(cut).is_err());
        assert_eq!(s.capacity_in_words(), 8);

        let moved = MemRegion::with_size(bottom + HEAP_WORD_SIZE, 8 * HEAP_WORD_SIZE).unwrap();
        assert!(s.resize_keeping_top(moved).is_err());

        let grown = MemRegion::with_size(bottom, 16 * HEAP_WORD_SIZE).unwrap();
        s.resize_keeping_top(grown).unwrap();
        assert_eq!(s.used_in_words(), 3);
        assert_eq!(s.capacity_in_words(), 16);
    }

    #[test]
    fn test_set_bounds_and_top() {
        let mut s = space(8 * HEAP_WORD_SIZE);
        s.allocate(5).unwrap();

        let region = MemRegion::with_size(0x20_0000, 4 * HEAP_WORD_SIZE).unwrap();
        s.set_bounds(region);
        assert_eq!(s.region(), region);
        assert!(s.is_empty());

        s.set_top(region.start() + HEAP_WORD_SIZE).unwrap();
        assert_eq!(s.used_region().byte_size(), HEAP_WORD_SIZE);
        assert!(s.set_top(region.end() + 1).is_err());
        assert!(s.contains(region.start()));
        assert!(!s.contains(region.end()));
    }
}
