//! Narrow collaborator interfaces
//!
//! Each collaborator of the generation gets only the slice it needs:
//! - the adaptive sizing policy reads ceilings through [`SizingView`];
//! - the heap orchestrator drives cycles through [`GenerationAdmin`];
//! - the elastic-memory controller inflates the balloon through
//!   [`ElasticMemory`].

use crate::compaction::SpaceCompactor;
use crate::young_gen::{ResizeOutcome, YoungGeneration};
use crate::GcResult;
use vm_osal::VirtualMemory;

/// Read-only capacity queries for the adaptive sizing policy
pub trait SizingView {
    fn committed_size(&self) -> usize;
    fn min_gen_size(&self) -> usize;
    /// Ceiling over the reservation, after the capacity policy
    fn max_size(&self) -> usize;
    /// Ceiling over the configured maximum, after the capacity policy
    fn gen_size_limit(&self) -> usize;
    fn eden_capacity(&self) -> usize;
    fn survivor_capacity(&self) -> usize;
    /// Bytes held by the from-space after the last scavenge
    fn live_survivor_bytes(&self) -> usize;
}

/// Cycle operations for the heap orchestrator
///
/// Every method runs at a safepoint.
pub trait GenerationAdmin: SizingView {
    fn resize(&mut self, eden_bytes: usize, survivor_bytes: usize) -> GcResult<ResizeOutcome>;
    fn swap_spaces(&mut self);
    fn reset_survivors_after_shrink(&mut self) -> GcResult<bool>;
    fn precompact(&self, compactor: &mut dyn SpaceCompactor);
    fn adjust_pointers(&self, compactor: &mut dyn SpaceCompactor);
    fn compact(&mut self, compactor: &mut dyn SpaceCompactor) -> GcResult<()>;
}

/// Balloon control for the elastic-memory controller
pub trait ElasticMemory {
    fn set_balloon_size(&mut self, bytes: usize);
    fn init_balloon(&mut self);
    fn balloon_size(&self) -> usize;
}

impl<M: VirtualMemory> SizingView for YoungGeneration<M> {
    fn committed_size(&self) -> usize {
        YoungGeneration::committed_size(self)
    }

    fn min_gen_size(&self) -> usize {
        YoungGeneration::min_gen_size(self)
    }

    fn max_size(&self) -> usize {
        YoungGeneration::max_size(self)
    }

    fn gen_size_limit(&self) -> usize {
        YoungGeneration::gen_size_limit(self)
    }

    fn eden_capacity(&self) -> usize {
        self.eden_space().capacity_in_bytes()
    }

    fn survivor_capacity(&self) -> usize {
        self.from_space().capacity_in_bytes()
    }

    fn live_survivor_bytes(&self) -> usize {
        self.from_space().used_in_bytes()
    }
}

impl<M: VirtualMemory> GenerationAdmin for YoungGeneration<M> {
    fn resize(&mut self, eden_bytes: usize, survivor_bytes: usize) -> GcResult<ResizeOutcome> {
        YoungGeneration::resize(self, eden_bytes, survivor_bytes)
    }

    fn swap_spaces(&mut self) {
        YoungGeneration::swap_spaces(self);
    }

    fn reset_survivors_after_shrink(&mut self) -> GcResult<bool> {
        YoungGeneration::reset_survivors_after_shrink(self)
    }

    fn precompact(&self, compactor: &mut dyn SpaceCompactor) {
        YoungGeneration::precompact(self, compactor);
    }

    fn adjust_pointers(&self, compactor: &mut dyn SpaceCompactor) {
        YoungGeneration::adjust_pointers(self, compactor);
    }

    fn compact(&mut self, compactor: &mut dyn SpaceCompactor) -> GcResult<()> {
        YoungGeneration::compact(self, compactor)
    }
}

impl<M: VirtualMemory> ElasticMemory for YoungGeneration<M> {
    fn set_balloon_size(&mut self, bytes: usize) {
        YoungGeneration::set_balloon_size(self, bytes);
    }

    fn init_balloon(&mut self) {
        YoungGeneration::init_balloon(self);
    }

    fn balloon_size(&self) -> usize {
        YoungGeneration::balloon_size(self)
    }
}
