//! Half-open byte ranges and alignment arithmetic
//!
//! Every boundary inside the generation is a [`MemRegion`]. Construction
//! rejects inverted or overflowing ranges, and [`SpaceLayout`] rejects any
//! partition that does not tile the committed range exactly.

use std::fmt;

use serde::Serialize;

use crate::{GcError, GcResult, HEAP_WORD_SIZE};

/// Round `value` down to a multiple of `alignment` (a power of two)
#[inline]
pub const fn align_down(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    value & !(alignment - 1)
}

/// Round `value` up to a multiple of `alignment` (a power of two)
///
/// Saturates at the largest aligned `usize` instead of overflowing.
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(v) => align_down(v, alignment),
        None => align_down(usize::MAX, alignment),
    }
}

/// Whether `value` is a multiple of `alignment` (a power of two)
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    value & (alignment - 1) == 0
}

/// Half-open byte range `[start, end)`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct MemRegion {
    start: usize,
    end: usize,
}

impl MemRegion {
    /// Create `[start, end)`
    ///
    /// # Errors
    ///
    /// Returns [`GcError::InvalidRange`] if `start > end`
    pub fn new(start: usize, end: usize) -> GcResult<Self> {
        if start > end {
            return Err(GcError::invalid_range(start, end));
        }
        Ok(Self { start, end })
    }

    /// Create `[start, start + size)`
    ///
    /// # Errors
    ///
    /// Returns [`GcError::InvalidRange`] if the end overflows
    pub fn with_size(start: usize, size: usize) -> GcResult<Self> {
        let end = start
            .checked_add(size)
            .ok_or_else(|| GcError::invalid_range(start, usize::MAX))?;
        Ok(Self { start, end })
    }

    /// Range whose bounds are already known to be ordered
    pub(crate) const fn from_bounds(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    /// Empty range at `addr`
    pub const fn empty(addr: usize) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// First byte
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last byte
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Size in bytes
    pub const fn byte_size(&self) -> usize {
        self.end - self.start
    }

    /// Size in heap words
    pub const fn word_size(&self) -> usize {
        self.byte_size() / HEAP_WORD_SIZE
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub const fn contains(&self, addr: usize) -> bool {
        self.start <= addr && addr < self.end
    }

    /// Whether `other` lies entirely inside this range
    pub const fn contains_region(&self, other: &MemRegion) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the two ranges share at least one byte
    pub const fn overlaps(&self, other: &MemRegion) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Common part of two ranges, empty if they are disjoint
    pub fn intersection(&self, other: &MemRegion) -> MemRegion {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if start < end {
            MemRegion { start, end }
        } else {
            MemRegion::empty(start.min(self.end))
        }
    }
}

impl fmt::Debug for MemRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

impl fmt::Display for MemRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Validated partition of the committed range into eden and two survivors
///
/// The physical order is fixed: eden, then the lower survivor, then the
/// upper survivor. Which survivor plays `from` and which plays `to` is a
/// separate role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpaceLayout {
    pub eden: MemRegion,
    pub lower: MemRegion,
    pub upper: MemRegion,
}

impl SpaceLayout {
    /// Check that `eden`, `lower`, `upper` tile `committed` in order
    ///
    /// # Errors
    ///
    /// Returns [`GcError::LayoutViolation`] naming the first broken rule
    pub fn new(
        committed: MemRegion,
        eden: MemRegion,
        lower: MemRegion,
        upper: MemRegion,
    ) -> GcResult<Self> {
        let named = [("eden", eden), ("lower survivor", lower), ("upper survivor", upper)];
        if let Some((name, region)) = named.iter().find(|(_, r)| r.is_empty()) {
            return Err(GcError::layout_violation(format!(
                "{name} space {region} is empty"
            )));
        }
        if eden.start() != committed.start() {
            return Err(GcError::layout_violation(format!(
                "eden {eden} does not start at committed bottom {:#x}",
                committed.start()
            )));
        }
        if eden.end() != lower.start() || lower.end() != upper.start() {
            return Err(GcError::layout_violation(format!(
                "spaces are not contiguous: eden {eden}, lower {lower}, upper {upper}"
            )));
        }
        if upper.end() != committed.end() {
            return Err(GcError::layout_violation(format!(
                "upper survivor {upper} does not end at committed top {:#x}",
                committed.end()
            )));
        }

        Ok(Self { eden, lower, upper })
    }

    /// Build a layout from sizes laid out upward from `bottom`
    ///
    /// # Errors
    ///
    /// Returns an error if the sizes overflow or any of them is zero
    pub fn from_sizes(bottom: usize, eden: usize, lower: usize, upper: usize) -> GcResult<Self> {
        let eden_region = MemRegion::with_size(bottom, eden)?;
        let lower_region = MemRegion::with_size(eden_region.end(), lower)?;
        let upper_region = MemRegion::with_size(lower_region.end(), upper)?;
        let committed = MemRegion::new(bottom, upper_region.end())?;
        Self::new(committed, eden_region, lower_region, upper_region)
    }

    /// Range covered by the three spaces
    pub fn committed(&self) -> MemRegion {
        MemRegion {
            start: self.eden.start(),
            end: self.upper.end(),
        }
    }
}
