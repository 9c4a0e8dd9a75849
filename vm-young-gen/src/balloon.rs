//! Visible capacity policies
//!
//! The adaptive sizing policy never sees the true capacity bounds directly:
//! it reads `max_size()` / `gen_size_limit()` through a
//! [`VisibleCapacityPolicy`]. A policy may withhold part of the ceiling so the
//! sizing policy asks for a smaller generation. It never commits or
//! uncommits anything itself, and it cannot promise more shrinkage than the
//! resize path will perform: the visible ceiling is floored at
//! `committed - limit_gen_shrink(withheld)`.

use std::fmt;

use crate::region::align_down;
use crate::resize::ResizePlanner;

/// Inputs for computing a visible ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityBounds {
    /// Un-ballooned ceiling (reserved size or configured maximum)
    pub true_bound: usize,
    pub committed: usize,
    pub alignment: usize,
}

/// Reporting transform over the generation's capacity ceilings
pub trait VisibleCapacityPolicy: fmt::Debug + Send + Sync {
    /// Policy name, for logs
    fn name(&self) -> &'static str;

    /// Bytes currently withheld from the reported ceiling
    fn withheld(&self) -> usize;

    /// Ask the policy to withhold `bytes`
    ///
    /// `max_gen_size` and `alignment` bound what the policy may store.
    fn set_withheld(&mut self, bytes: usize, max_gen_size: usize, alignment: usize);

    /// Stop withholding anything
    fn reset(&mut self);

    /// Ceiling reported to the sizing policy
    fn visible_ceiling(&self, bounds: CapacityBounds, planner: &ResizePlanner) -> usize {
        let withheld = self.withheld();
        let lower_bound = bounds
            .committed
            .saturating_sub(planner.limit_gen_shrink(withheld));
        let ballooned = bounds.true_bound.saturating_sub(withheld);
        align_down(ballooned.max(lower_bound), bounds.alignment)
    }
}

/// Elastic-memory balloon
///
/// An external controller inflates the balloon to make the sizing policy
/// believe there is less room, so the generation shrinks between cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balloon {
    size: usize,
}

impl Balloon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balloon size in bytes
    pub fn balloon_size(&self) -> usize {
        self.size
    }

    /// Clamp `bytes` to `[0, max_gen_size]`, align it down and store it
    pub fn set_balloon_size(&mut self, bytes: usize, max_gen_size: usize, alignment: usize) {
        let new_size = align_down(bytes.min(max_gen_size), alignment);
        if new_size != bytes {
            log::debug!("balloon request of {bytes} bytes clamped to {new_size}");
        }
        self.size = new_size;
    }

    /// Deflate the balloon completely
    pub fn init_balloon(&mut self) {
        self.size = 0;
    }
}

impl VisibleCapacityPolicy for Balloon {
    fn name(&self) -> &'static str {
        "balloon"
    }

    fn withheld(&self) -> usize {
        self.size
    }

    fn set_withheld(&mut self, bytes: usize, max_gen_size: usize, alignment: usize) {
        self.set_balloon_size(bytes, max_gen_size, alignment);
    }

    fn reset(&mut self) {
        self.init_balloon();
    }
}

/// Reports the true bounds unchanged and ignores withholding requests
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl VisibleCapacityPolicy for Unrestricted {
    fn name(&self) -> &'static str {
        "unrestricted"
    }

    fn withheld(&self) -> usize {
        0
    }

    fn set_withheld(&mut self, bytes: usize, _max_gen_size: usize, _alignment: usize) {
        log::debug!("unrestricted capacity policy ignores request to withhold {bytes} bytes");
    }

    fn reset(&mut self) {}
}
