//! Full-collection hooks
//!
//! On the non-copying fallback path the full collector compacts the young
//! generation in place. The generation only walks its spaces in eden, from,
//! to order and moves each space's top to what the compactor reports.

use crate::bump_space::{BumpSpace, SpaceKind};

/// Per-space work of the full (mark-compact) collector
pub trait SpaceCompactor {
    /// Compute forwarding addresses for live objects in `space`
    fn precompact(&mut self, kind: SpaceKind, space: &BumpSpace);

    /// Update references held by objects in `space`
    fn adjust_pointers(&mut self, kind: SpaceKind, space: &BumpSpace);

    /// Slide live objects to the bottom of `space`
    ///
    /// Returns the number of bytes live at the bottom afterwards.
    fn compact(&mut self, kind: SpaceKind, space: &BumpSpace) -> usize;
}
